use axum::extract::State;
use serde::Serialize;

use taskmatrix_domain::entities::TaskFilter;

use crate::{error::ApiResult, response::success, routes::AppState};

/// 系统健康状态
#[derive(Debug, Serialize)]
pub struct SystemHealth {
    pub status: String,
    pub database_status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// 获取系统健康状态（含数据库连通性检查）
pub async fn get_system_health(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let database_status = match state.task_repo.count(&TaskFilter::default()).await {
        Ok(_) => "ok".to_string(),
        Err(e) => format!("error: {e}"),
    };

    let status = if database_status == "ok" {
        "healthy"
    } else {
        "degraded"
    };

    Ok(success(SystemHealth {
        status: status.to_string(),
        database_status,
        timestamp: chrono::Utc::now(),
    }))
}

/// 手动触发一次象限重算
pub async fn trigger_sweep(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let report = state.sweep_service.run_once().await?;
    Ok(success(report))
}
