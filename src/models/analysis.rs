use super::row::{serialize_qty, Row};
use serde::Serialize;

/// 统计结果 (临时计算，不落盘)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(serialize_with = "serialize_qty")]
    pub total_available: f64,
    #[serde(serialize_with = "serialize_qty")]
    pub total_sold: f64,
    #[serde(rename = "lowestStock")]
    pub lowest: Row,
    #[serde(rename = "highestStock")]
    pub highest: Row,
}

/// 统计结果：空数据集单独区分，不返回全零
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Empty,
    Summary(AnalysisResult),
}

impl Analysis {
    pub fn summary(&self) -> Option<&AnalysisResult> {
        match self {
            Analysis::Summary(result) => Some(result),
            Analysis::Empty => None,
        }
    }
}
