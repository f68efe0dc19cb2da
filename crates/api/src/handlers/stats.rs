use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use taskmatrix_domain::matrix::days_until_deadline;

use crate::{error::ApiResult, response::success, routes::AppState};

/// 单个临近截止任务的概览
#[derive(Debug, Serialize)]
pub struct DeadlineEntry {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deadline_at: DateTime<Utc>,
    pub days_remaining: i64,
}

/// 获取任务总体统计（按象限和完成状态）
pub async fn get_stats(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let stats = state.task_repo.get_stats().await?;
    Ok(success(stats))
}

/// 获取截止时间概览：未完成且设置了截止时间的任务，按剩余天数升序
pub async fn get_deadline_stats(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let tasks = state.task_repo.list_open_with_deadline().await?;

    let now = Utc::now();
    let entries: Vec<DeadlineEntry> = tasks
        .into_iter()
        .filter_map(|task| {
            let deadline_at = task.deadline_at?;
            let days_remaining = days_until_deadline(Some(deadline_at), now)?;
            Some(DeadlineEntry {
                id: task.id,
                title: task.title,
                description: task.description,
                created_at: task.created_at,
                deadline_at,
                days_remaining,
            })
        })
        .collect();

    Ok(success(entries))
}

/// 获取每个用户的任务数量
pub async fn get_user_stats(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let counts = state.task_repo.count_by_user().await?;
    Ok(success(counts))
}
