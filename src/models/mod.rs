pub mod analysis;
pub mod row;

pub use analysis::{Analysis, AnalysisResult};
pub use row::{
    coerce_json_qty, coerce_qty, format_qty, qty_json, Dataset, Row, RowPatch, BILLING_COLUMN,
    CODE_COLUMN, DEFAULT_COLUMNS, REMARKS_COLUMN, RETAIL_COLUMN,
};
