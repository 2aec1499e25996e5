use thiserror::Error;

/// 存储层错误
#[derive(Error, Debug)]
pub enum StoreError {
    /// 按编码更新时没有匹配的行
    #[error("Product not found: {0}")]
    NotFound(String),

    /// 文件不可读写、损坏或写锁等待超时
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::StorageUnavailable(format!("I/O error: {}", err))
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        StoreError::StorageUnavailable(format!("CSV error: {}", err))
    }
}

impl From<tempfile::PersistError> for StoreError {
    fn from(err: tempfile::PersistError) -> Self {
        StoreError::StorageUnavailable(format!("Failed to replace data file: {}", err.error))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
