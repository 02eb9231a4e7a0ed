//! 路由配置模块
//!
//! 定义 REST API 端点的路由映射并组装中间件栈。

use std::time::Duration;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use ruleforge_shared::config::AppConfig;
use ruleforge_shared::observability::middleware as obs_middleware;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::SERVICE_NAME;
use crate::handlers;

/// 构建规则相关的路由
pub fn rule_routes() -> Router {
    Router::new()
        .route("/rules/create", post(handlers::rule::create_rule))
        .route("/rules/evaluate", post(handlers::rule::evaluate_rule))
}

/// 组装完整应用
pub fn app(config: &AppConfig) -> Router {
    // 浏览器端或跨域工具直接调用时需要放开 CORS，
    // 服务不携带凭据，宽松策略即可
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", rule_routes())
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )))
        .layer(cors)
        // 可观测性中间件：请求追踪和指标收集
        .layer(axum::middleware::from_fn(obs_middleware::http_tracing))
        .layer(axum::middleware::from_fn(obs_middleware::request_id))
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}
