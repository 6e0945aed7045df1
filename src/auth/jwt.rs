//! JWT token generation and validation
//! A single self-contained session token, carried in a cookie

use crate::{config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for session tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Username
    pub username: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// JWT service
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: u64,
    renewal_threshold_secs: u64,
}

impl TokenService {
    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        Ok(Self {
            encoding_key,
            decoding_key,
            token_ttl_secs: config.security.token_ttl_secs,
            renewal_threshold_secs: config.security.token_renewal_threshold_secs,
        })
    }

    /// Issue a session token bound to a user identity
    pub fn issue(&self, user_id: &Uuid, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.token_ttl_secs as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {:?}", e);
            AppError::Internal
        })
    }

    /// Validate and decode a session token
    ///
    /// Malformed token, signature mismatch and expiry all collapse into
    /// `AppError::Unauthorized`; the concrete reason only reaches the log.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        Ok(decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::Unauthorized
            })?
            .claims)
    }

    /// Whether the token's remaining validity has dropped below the
    /// sliding-window renewal threshold
    pub fn needs_renewal(&self, claims: &Claims, now: i64) -> bool {
        claims.exp - now < self.renewal_threshold_secs as i64
    }

    /// Token lifetime, used for the cookie max-age
    pub fn token_ttl_secs(&self) -> u64 {
        self.token_ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    // Mock config for testing
    fn test_config() -> AppConfig {
        AppConfig {
            server: crate::config::ServerConfig {
                addr: "127.0.0.1:4000".to_string(),
                graceful_shutdown_timeout_secs: 30,
            },
            database: crate::config::DatabaseConfig {
                url: Secret::new("postgresql://localhost/test".to_string()),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_secs: 30,
                idle_timeout_secs: 600,
                max_lifetime_secs: 1800,
            },
            logging: crate::config::LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
            security: crate::config::SecurityConfig {
                jwt_secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
                token_ttl_secs: 604800,
                token_renewal_threshold_secs: 302400,
                password_min_length: 6,
            },
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = TokenService::from_config(&test_config()).unwrap();
        let user_id = Uuid::new_v4();

        let token = service.issue(&user_id, "seobe").unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "seobe");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_token_fails() {
        let service = TokenService::from_config(&test_config()).unwrap();
        assert!(service.verify("invalid_token").is_err());
        assert!(service.verify("").is_err());
    }

    #[test]
    fn test_tampered_signature_fails() {
        let service = TokenService::from_config(&test_config()).unwrap();

        let mut other_config = test_config();
        other_config.security.jwt_secret =
            Secret::new("another_secret_key_32_characters!!!".to_string());
        let other_service = TokenService::from_config(&other_config).unwrap();

        let token = other_service.issue(&Uuid::new_v4(), "seobe").unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_fails() {
        let service = TokenService::from_config(&test_config()).unwrap();
        let now = Utc::now().timestamp();

        // 两小时前就过期的令牌（超出 jsonwebtoken 默认 60s leeway）
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "seobe".to_string(),
            iat: now - 10_000,
            exp: now - 7_200,
        };
        let secret = "test_secret_key_32_characters_long!";
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_needs_renewal_boundary() {
        let service = TokenService::from_config(&test_config()).unwrap();
        let now = Utc::now().timestamp();
        let threshold = 302400i64; // 3.5 days

        let fresh = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "seobe".to_string(),
            iat: now,
            exp: now + threshold + 60,
        };
        assert!(!service.needs_renewal(&fresh, now));

        let stale = Claims {
            exp: now + threshold - 60,
            ..fresh.clone()
        };
        assert!(service.needs_renewal(&stale, now));

        // 剩余正好等于阈值 → 不续期
        let exact = Claims {
            exp: now + threshold,
            ..fresh
        };
        assert!(!service.needs_renewal(&exact, now));
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = test_config();
        config.security.jwt_secret = Secret::new("short".to_string());
        assert!(TokenService::from_config(&config).is_err());
    }
}
