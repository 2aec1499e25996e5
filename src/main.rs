use std::sync::Arc;
use stock_sheet_server::{api, AppConfig, FileStore};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式，级别由 RUST_LOG 控制 (默认 info)
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 数据文件存储
    let store = FileStore::new(config.storage.path.clone())
        .with_lock_timeout(config.storage.lock_timeout());
    info!("Stock data file: {}", store.path().display());

    let app = api::router(Arc::new(store), config.server.static_dir.as_deref());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server running at http://{}", addr);
    info!("API Endpoints:");
    info!("  POST /update-stock   - update one product by code");
    info!("  GET  /stocks         - list all products");
    info!("  GET  /analysis       - totals and lowest/highest stock");
    info!("  GET  /debug-headers  - column names of the first row");
    if let Some(dir) = &config.server.static_dir {
        info!("Serving static files from {}", dir.display());
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
