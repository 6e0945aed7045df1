//! 认证 API 集成测试
//! 需要 PostgreSQL（TEST_DATABASE_URL），因此默认 ignore

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{create_test_app_state, setup_test_db, TEST_JWT_SECRET};

/// 从 Set-Cookie 头中取出 access_token 的值
fn extract_access_token(response: &axum::response::Response<axum::body::Body>) -> Option<String> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = set_cookie.split(';').next()?;
    let value = pair.strip_prefix("access_token=")?;
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

async fn register(
    app: &axum::Router,
    username: &str,
    password: &str,
) -> axum::response::Response<axum::body::Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"username": username, "password": password}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn login(
    app: &axum::Router,
    username: &str,
    password: &str,
) -> axum::response::Response<axum::body::Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"username": username, "password": password}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn check(
    app: &axum::Router,
    token: Option<&str>,
) -> axum::response::Response<axum::body::Body> {
    let mut builder = Request::builder().uri("/api/auth/check");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("access_token={}", token));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_register_login_check_logout_flow() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;
    let app = blog_system::routes::create_router(create_test_app_state(pool));

    // 注册 → 2xx + Cookie
    let response = register(&app, "seobe", "mypass123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = extract_access_token(&response).expect("register must set session cookie");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let registered: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(registered["username"], "seobe");
    // 哈希字段绝不序列化
    assert!(registered.get("password_hash").is_none());

    // 同名再注册 → 409
    let response = register(&app, "seobe", "otherpass").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 错误密码 → 401
    let response = login(&app, "seobe", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 未知用户 → 401，与密码错误不可区分
    let wrong_pw_body = login(&app, "seobe", "wrong").await;
    let unknown_user_body = login(&app, "nobody", "mypass123").await;
    assert_eq!(wrong_pw_body.status(), unknown_user_body.status());

    // 正确凭据 → 2xx + 新 Cookie，令牌解码出正确身份
    let response = login(&app, "seobe", "mypass123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let login_token = extract_access_token(&response).expect("login must set session cookie");

    let response = check(&app, Some(&login_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let identity: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(identity["username"], "seobe");
    assert_eq!(identity["id"], registered["id"]);

    // 注册时的 Cookie 也还有效（没有回收机制）
    let response = check(&app, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // 无 Cookie → 401
    let response = check(&app, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 登出 → 204，Cookie 被清空
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, format!("access_token={}", login_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(extract_access_token(&response).is_none());

    // 客户端丢弃 Cookie 后 → 401
    let response = check(&app, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_near_expiry_token_gets_refreshed() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;
    let user_id = common::create_test_user(&pool, "seobe", "mypass123")
        .await
        .expect("Failed to create test user");
    let app = blog_system::routes::create_router(create_test_app_state(pool));

    let now = Utc::now().timestamp();

    // 剩余有效期低于 3.5 天 → 响应带新 Cookie
    let claims = blog_system::auth::jwt::Claims {
        sub: user_id.to_string(),
        username: "seobe".to_string(),
        iat: now - 600_000,
        exp: now + 3_600,
    };
    let stale_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let response = check(&app, Some(&stale_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = extract_access_token(&response).expect("stale session must be renewed");
    assert_ne!(refreshed, stale_token);

    // 新令牌本身可用
    let response = check(&app, Some(&refreshed)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // 剩余有效期高于阈值 → 不续期
    let response = check(&app, Some(&refreshed)).await;
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_no_duplicate_user_created_on_conflict() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;
    let app = blog_system::routes::create_router(create_test_app_state(pool.clone()));

    let response = register(&app, "seobe", "mypass123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = register(&app, "seobe", "mypass123").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind("seobe")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
