//! HTTP 应用组装

pub mod product;

use axum::{extract::State, middleware, response::Json, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::common::middleware::request_logging_middleware;
use product::repository::ProductRepository;

/// 构建完整的路由，包含产品接口、健康检查和公共中间件
pub fn build_app(repository: ProductRepository) -> Router {
    let health = Router::new()
        .route("/health", get(health_check))
        .with_state(repository.clone());

    Router::new()
        .merge(product::routes(repository))
        .merge(health)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查
async fn health_check(State(repository): State<ProductRepository>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": repository.backend(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
