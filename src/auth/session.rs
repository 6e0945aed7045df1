//! 会话中间件
//! 每个请求先经过这里：从 Cookie 提取令牌、验证、附加身份、滑动续期
//! 本中间件从不终止请求，验证失败一律降级为匿名继续

use crate::{
    auth::{guards::Identity, jwt::TokenService},
    middleware::AppState,
    repository::UserRepository,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// 会话 Cookie 名称
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// 构造会话 Cookie：HttpOnly，有效期与令牌一致
pub fn session_cookie(token: String, ttl_secs: u64) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(ttl_secs as i64))
        .build()
}

/// 登出时用于覆盖会话 Cookie 的删除标记
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build()
}

/// 会话中间件
///
/// 1. 无 Cookie → 匿名继续
/// 2. 验证失败 → 匿名继续，原因只进日志（对客户端不可见）
/// 3. 验证成功 → 把 `Identity` 附加到请求扩展
/// 4. 剩余有效期低于阈值 → 查库并重签令牌，写回响应 Cookie；
///    查库失败只跳过续期，不影响已附加的身份
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) else {
        return next.run(req).await;
    };

    let claims = match state.token_service.verify(cookie.value()) {
        Ok(claims) => claims,
        Err(reason) => {
            tracing::debug!(%reason, "Session token rejected, continuing as anonymous");
            return next.run(req).await;
        }
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed subject in session token, continuing as anonymous");
            return next.run(req).await;
        }
    };

    req.extensions_mut().insert(Identity {
        user_id,
        username: claims.username.clone(),
    });

    // 滑动续期：剩余有效期不足时重签 7 天令牌
    if state.token_service.needs_renewal(&claims, Utc::now().timestamp()) {
        if let Some(token) = reissue_token(&state.token_service, &state.db, &user_id).await {
            let jar = jar.add(session_cookie(token, state.token_service.token_ttl_secs()));
            let response = next.run(req).await;
            return (jar, response).into_response();
        }
    }

    next.run(req).await
}

/// 续期是尽力而为：任何一步失败都返回 None，请求按原身份继续
async fn reissue_token(
    token_service: &TokenService,
    db: &sqlx::PgPool,
    user_id: &Uuid,
) -> Option<String> {
    let user = match UserRepository::new(db.clone()).find_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(%user_id, "Token subject no longer exists, skipping renewal");
            return None;
        }
        Err(e) => {
            tracing::warn!(error = %e, %user_id, "User lookup failed, skipping renewal");
            return None;
        }
    };

    match token_service.issue(&user.id, &user.username) {
        Ok(token) => Some(token),
        Err(e) => {
            tracing::warn!(error = %e, %user_id, "Token reissue failed, skipping renewal");
            None
        }
    }
}
