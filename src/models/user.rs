//! User domain models

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户名规则：3~20 位字母数字
/// 长度由 validator 检查，字符集由该模式检查
pub static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Registration request
///
/// 字段缺失不在反序列化阶段拒绝，统一走验证 → 400 并携带详情
#[derive(Debug, Deserialize, validator::Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 20))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login request
///
/// 字段缺失不在反序列化阶段拒绝：空用户名/空密码与错误凭据
/// 走同一条 401 路径，对外不可区分
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// User response (without sensitive data)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}
