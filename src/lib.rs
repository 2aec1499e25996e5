pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use error::StoreError;
pub use models::{Analysis, AnalysisResult, Dataset, Row, RowPatch};
pub use service::analyze;
pub use store::{FileStore, RecordStore};
