pub mod file_store;
pub mod sheet;

pub use file_store::FileStore;

use crate::error::Result;
use crate::models::{Dataset, Row, RowPatch};

/// 记录存储契约
///
/// 每次读取都从底层文件重新加载，不做内存缓存；文件是唯一的数据来源。
pub trait RecordStore: Send + Sync {
    /// 读取完整数据集；文件不存在时返回空数据集
    fn load(&self) -> Result<Dataset>;

    /// 整体写回并原子替换文件
    fn save(&self, dataset: &Dataset) -> Result<()>;

    /// 按编码局部更新第一条匹配的行，返回更新后的行
    ///
    /// 读取、修改、写回在同一个临界区内完成，并发调用不会丢失更新。
    fn update_by_code(&self, code: &str, patch: &RowPatch) -> Result<Row>;
}
