//! 授权守卫
//! 会话中间件之后运行的两类检查：必须登录、必须是资源属主

use crate::error::AppError;
use axum::extract::FromRequestParts;
use uuid::Uuid;

/// 认证身份（由会话中间件附加到请求扩展）
/// 每个请求独立派生，从不落库
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

// 实现 FromRequestParts：handler 直接声明 Identity 参数即等价于
// “必须登录”守卫，身份缺失时以 401 拒绝
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 属主检查：资源内嵌的作者标识与当前身份一致才放行
/// 身份缺失同样视为拒绝（403）
pub fn require_ownership(identity: Option<&Identity>, owner_id: &Uuid) -> Result<(), AppError> {
    match identity {
        Some(identity) if identity.user_id == *owner_id => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}
