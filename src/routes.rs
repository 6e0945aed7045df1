//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, limit::RequestBodyLimitLayer};

use crate::{auth, handlers, middleware::AppState};

/// 请求体大小上限（1 MiB，正文是文本）
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由
    // check 的登录要求由 Identity 提取器承担，这里不区分
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/check", get(handlers::auth::check))
        .route("/api/auth/logout", post(handlers::auth::logout));

    // 文章路由
    // 列表/详情公开；发表/修改/删除在 handler 侧由 Identity 与属主检查把关
    let post_routes = Router::new()
        .route(
            "/api/posts",
            get(handlers::post::list).post(handlers::post::write),
        )
        .route(
            "/api/posts/{id}",
            get(handlers::post::read)
                .patch(handlers::post::update)
                .delete(handlers::post::remove),
        );

    // 组合所有路由
    // 会话中间件对所有路由生效，请求追踪在最外层
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(post_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::session::session_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(axum::middleware::from_fn(
            crate::middleware::request_tracking_middleware,
        ))
        .with_state(state)
}
