//! 认证模块
//! 令牌签发与验证、密码哈希、会话中间件、授权守卫

pub mod guards;
pub mod jwt;
pub mod password;
pub mod session;

pub use guards::Identity;
pub use jwt::TokenService;
