//! 健康检查处理器
//! 提供 /health 和 /ready 端点

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{db, middleware::AppState};

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

/// 健康检查项
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 应用启动时间（需要在 main.rs 中设置；0 表示未设置）
static APP_START_TIME: AtomicU64 = AtomicU64::new(0);

/// 设置应用启动时间
pub fn set_start_time() {
    APP_START_TIME.store(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
        Ordering::Relaxed,
    );
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    let start = APP_START_TIME.load(Ordering::Relaxed);
    if start == 0 {
        return 0;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().saturating_sub(start))
        .unwrap_or(0)
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
    })
}

/// 就绪探针
/// 检查数据库等依赖
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> Json<ReadinessResponse> {
    let mut checks = Vec::new();

    // 数据库检查
    let db_health = db::health_check(&state.db).await;
    checks.push(HealthCheck {
        name: "database".to_string(),
        status: match &db_health {
            db::HealthStatus::Healthy => "healthy".to_string(),
            db::HealthStatus::Unhealthy(_) => "unhealthy".to_string(),
        },
        message: match db_health {
            db::HealthStatus::Healthy => None,
            db::HealthStatus::Unhealthy(msg) => Some(msg),
        },
    });

    db::record_pool_metrics(&state.db);

    let all_healthy = checks.iter().all(|c| c.status == "healthy");

    Json(ReadinessResponse {
        ready: all_healthy,
        checks,
    })
}
