use crate::error::StoreError;
use crate::models::{coerce_json_qty, format_qty, Analysis, Row, RowPatch};
use crate::service::analyze;
use crate::store::RecordStore;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// 处理器共享的存储
pub type SharedStore = Arc<dyn RecordStore>;

/// 请求体: 按编码更新库存
///
/// 数量字段接受数字或字符串；字段缺失表示不修改，`remarks: null` 表示清空备注。
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStockRequest {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub retail: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub billing: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub remarks: Option<Value>,
}

impl UpdateStockRequest {
    /// 编码统一按字符串比较，数字编码转为十进制文本；空编码不匹配任何行
    pub fn code_key(&self) -> Option<String> {
        match self.code.as_ref()? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.is_f64() => n.as_f64().map(format_qty),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn to_patch(&self) -> RowPatch {
        RowPatch {
            retail: self.retail.as_ref().map(coerce_json_qty),
            billing: self.billing.as_ref().map(coerce_json_qty),
            remarks: self.remarks.as_ref().map(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }),
        }
    }
}

/// 字段出现即为 `Some`，包括显式的 `null`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// 响应体: 更新成功
#[derive(Debug, Serialize)]
pub struct UpdateStockResponse {
    pub success: bool,
    pub message: String,
    pub item: Row,
}

/// 响应体: 诊断用表头
#[derive(Debug, Serialize)]
pub struct DebugHeadersResponse {
    pub headers: Vec<String>,
    #[serde(rename = "firstRow")]
    pub first_row: Row,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 按编码更新库存 - POST /update-stock
pub async fn update_stock(
    State(store): State<SharedStore>,
    Json(req): Json<UpdateStockRequest>,
) -> Response {
    let Some(code) = req.code_key() else {
        tracing::warn!("update-stock request without a usable code");
        return store_error_response(StoreError::NotFound(String::new()));
    };
    let patch = req.to_patch();

    let target = code.clone();
    match run_blocking(&store, move |s| s.update_by_code(&target, &patch)).await {
        Ok(item) => {
            tracing::info!("Stock {} updated", code);
            let response = UpdateStockResponse {
                success: true,
                message: "Stock updated!".to_string(),
                item,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// 全部库存 - GET /stocks
pub async fn list_stocks(State(store): State<SharedStore>) -> Response {
    match run_blocking(&store, |s| s.load()).await {
        Ok(dataset) => (StatusCode::OK, Json(dataset.rows)).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// 库存统计 - GET /analysis
pub async fn analysis(State(store): State<SharedStore>) -> Response {
    let dataset = match run_blocking(&store, |s| s.load()).await {
        Ok(dataset) => dataset,
        Err(e) => return store_error_response(e),
    };

    match analyze(&dataset.rows) {
        Analysis::Summary(result) => (StatusCode::OK, Json(result)).into_response(),
        Analysis::Empty => {
            let response = MessageResponse {
                message: "No data available",
            };
            (StatusCode::OK, Json(response)).into_response()
        }
    }
}

/// 诊断：第一行的列名 - GET /debug-headers
pub async fn debug_headers(State(store): State<SharedStore>) -> Response {
    let dataset = match run_blocking(&store, |s| s.load()).await {
        Ok(dataset) => dataset,
        Err(e) => return store_error_response(e),
    };

    match dataset.rows.into_iter().next() {
        Some(first_row) => {
            let response = DebugHeadersResponse {
                headers: first_row.keys().into_iter().map(str::to_string).collect(),
                first_row,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        None => {
            let response = MessageResponse {
                message: "No data found",
            };
            (StatusCode::OK, Json(response)).into_response()
        }
    }
}

/// 文件读写放到阻塞线程池，避免占用异步运行时
async fn run_blocking<T, F>(store: &SharedStore, op: F) -> Result<T, StoreError>
where
    F: FnOnce(&dyn RecordStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| StoreError::StorageUnavailable(format!("storage task failed: {}", e)))?
}

fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound(code) => {
            tracing::warn!("Product {:?} not found", code);
            let response = ErrorResponse {
                error: "Product not found".to_string(),
            };
            (StatusCode::NOT_FOUND, Json(response)).into_response()
        }
        StoreError::StorageUnavailable(reason) => {
            tracing::error!("Storage unavailable: {}", reason);
            let response = ErrorResponse { error: reason };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}
