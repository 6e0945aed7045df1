//! 认证服务：注册、登录
//! 令牌在这里签发，Cookie 的设置/清除由 handler 负责

use crate::{
    auth::jwt::TokenService,
    auth::password::PasswordHasher,
    error::AppError,
    models::user::{LoginRequest, RegisterRequest, UserResponse},
    repository::UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

pub struct AuthService {
    db: PgPool,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(db: PgPool, token_service: Arc<TokenService>) -> Self {
        Self { db, token_service }
    }

    /// 用户注册
    ///
    /// 先查重后创建。两步之间没有事务保证，并发撞名依赖
    /// users.username 的唯一约束兜底（返回数据库错误 → 500）
    pub async fn register(&self, req: &RegisterRequest) -> Result<(UserResponse, String), AppError> {
        let user_repo = UserRepository::new(self.db.clone());

        // 用户名查重
        if user_repo.find_by_username(&req.username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        // 哈希密码并落库
        let hasher = PasswordHasher::new();
        let password_hash = hasher.hash(&req.password)?;

        let user = user_repo.create(&req.username, &password_hash).await?;

        // 签发会话令牌
        let token = self.token_service.issue(&user.id, &user.username)?;

        Ok((UserResponse::from(user), token))
    }

    /// 用户登录
    ///
    /// 字段缺失、用户不存在、密码错误走同一条 401 路径，
    /// 对外不可区分
    pub async fn login(&self, req: &LoginRequest) -> Result<(UserResponse, String), AppError> {
        if req.username.is_empty() || req.password.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let user = UserRepository::new(self.db.clone())
            .find_by_username(&req.username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // 验证密码
        let hasher = PasswordHasher::new();
        hasher.verify(&req.password, &user.password_hash)?;

        let token = self.token_service.issue(&user.id, &user.username)?;

        Ok((UserResponse::from(user), token))
    }
}
