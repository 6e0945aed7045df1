//! 认证相关的 HTTP 处理器
//! Cookie 的设置与清除都在这一层完成

use crate::{
    auth::guards::Identity,
    auth::password::PasswordHasher,
    auth::session,
    error::AppError,
    middleware::AppState,
    models::user::{LoginRequest, RegisterRequest, USERNAME_PATTERN},
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// 注册
///
/// POST /api/auth/register
/// { "username": "seobe", "password": "mypass123" }
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 验证请求形状：长度、字符集、密码策略
    req.validate()?;
    if !USERNAME_PATTERN.is_match(&req.username) {
        return Err(AppError::BadRequest(
            "Username must contain only alphanumeric characters".to_string(),
        ));
    }
    PasswordHasher::validate_password_policy(&req.password, &state.config)?;

    let (user, token) = state.auth_service.register(&req).await?;

    let jar = jar.add(session::session_cookie(
        token,
        state.token_service.token_ttl_secs(),
    ));

    Ok((jar, Json(user)))
}

/// 登录
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, token) = state.auth_service.login(&req).await?;

    let jar = jar.add(session::session_cookie(
        token,
        state.token_service.token_ttl_secs(),
    ));

    Ok((jar, Json(user)))
}

/// 查询当前会话
///
/// GET /api/auth/check
pub async fn check(identity: Identity) -> Result<impl IntoResponse, AppError> {
    Ok(Json(json!({
        "id": identity.user_id,
        "username": identity.username,
    })))
}

/// 登出：无条件清除 Cookie，重复调用结果一致
/// 已签发的令牌不回收，直到自然过期
///
/// POST /api/auth/logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(session::removal_cookie());
    (jar, StatusCode::NO_CONTENT)
}
