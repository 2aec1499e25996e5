pub mod aggregator;

pub use aggregator::analyze;
