use super::{sheet, RecordStore};
use crate::error::{Result, StoreError};
use crate::models::{Dataset, Row, RowPatch};
use parking_lot::{Mutex, MutexGuard};
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// 写锁默认等待时间
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// 基于单个 CSV 文件的记录存储
///
/// 所有写入 (`save` / `update_by_code`) 都经过同一把写锁；
/// 写入先落到同目录的临时文件，再整体替换目标文件，读取方只会看到完整的旧文件或新文件。
pub struct FileStore {
    path: PathBuf,
    write_gate: Mutex<()>,
    lock_timeout: Duration,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_gate: Mutex::new(()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_gate.try_lock_for(self.lock_timeout).ok_or_else(|| {
            StoreError::StorageUnavailable(format!(
                "timed out after {:?} waiting for write lock on {}",
                self.lock_timeout,
                self.path.display()
            ))
        })
    }

    fn read(&self) -> Result<Dataset> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Dataset::default()),
            Err(e) => return Err(e.into()),
        };
        sheet::read_dataset(BufReader::new(file))
    }

    /// 调用方必须持有写锁
    fn write(&self, dataset: &Dataset) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }

        sheet::write_dataset(tmp.as_file_mut(), dataset)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        sync_dir(dir)?;
        Ok(())
    }
}

/// 同步目录项，重命名在崩溃后仍然可见
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

impl RecordStore for FileStore {
    fn load(&self) -> Result<Dataset> {
        self.read()
    }

    fn save(&self, dataset: &Dataset) -> Result<()> {
        let _guard = self.acquire()?;
        self.write(dataset)
    }

    fn update_by_code(&self, code: &str, patch: &RowPatch) -> Result<Row> {
        let _guard = self.acquire()?;

        let mut dataset = self.read()?;
        let idx = dataset
            .position_of(code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        dataset.rows[idx].apply(patch);
        let updated = dataset.rows[idx].clone();

        self.write(&dataset)?;
        Ok(updated)
    }
}
