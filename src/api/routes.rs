use super::handlers::{self, SharedStore};
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// 构建路由
///
/// `static_dir` 为 `Some` 时，未匹配的路径由该目录下的静态文件响应。
pub fn router(store: SharedStore, static_dir: Option<&Path>) -> Router {
    // 允许任意来源 (前端单独部署)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/update-stock", post(handlers::update_stock))
        .route("/stocks", get(handlers::list_stocks))
        .route("/analysis", get(handlers::analysis))
        .route("/debug-headers", get(handlers::debug_headers))
        .with_state(store);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}
