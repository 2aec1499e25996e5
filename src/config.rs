use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 静态文件目录 (可选)，未匹配的路径回落到该目录
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 数据文件路径
    pub path: PathBuf,
    /// 写锁最长等待时间 (毫秒)
    pub lock_timeout_ms: u64,
}

impl StorageConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                static_dir: None,
            },
            storage: StorageConfig {
                path: PathBuf::from("stocks.csv"),
                lock_timeout_ms: 5000,
            },
        }
    }
}

impl AppConfig {
    /// 加载配置：默认值 < 配置文件 < 环境变量
    ///
    /// 配置文件默认为工作目录下可选的 `config.toml`，可通过 `APP_CONFIG` 指定；
    /// 环境变量使用 `APP__` 前缀，例如 `APP__SERVER__PORT=8080`、`APP__STORAGE__PATH=/data/stocks.csv`。
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var("APP_CONFIG") {
            Ok(path) => Self::load_from(Some(Path::new(&path))),
            Err(_) => Self::load_from(None),
        }
    }

    /// 从指定配置文件加载 (文件必须存在)；`None` 时尝试可选的 `config.toml`
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("storage.path", defaults.storage.path.to_string_lossy().to_string())?
            .set_default("storage.lock_timeout_ms", defaults.storage.lock_timeout_ms as i64)?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        builder
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
