use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use taskmatrix_domain::entities::{Quadrant, Task, TaskFilter};
use taskmatrix_domain::matrix::{calculate_urgency, days_until_deadline};
use taskmatrix_errors::TaskMatrixError;

use crate::{
    error::{ApiError, ApiResult},
    response::{created, success, success_with_message, PaginatedResponse},
    routes::AppState,
    types::UpdateField,
    validation::task::{
        validate_description, validate_search_keyword, validate_title, validate_user_id,
    },
};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// 任务创建请求
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub is_important: bool,
    pub deadline_at: Option<DateTime<Utc>>,
    pub user_id: i64,
}

/// 任务更新请求
///
/// deadline_at和description是三态字段：缺失不修改，null显式清空
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub description: UpdateField<String>,
    pub is_important: Option<bool>,
    #[serde(default)]
    pub deadline_at: UpdateField<DateTime<Utc>>,
}

/// 任务列表查询参数
#[derive(Debug, Deserialize)]
pub struct TaskQueryParams {
    pub quadrant: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<i64>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// 搜索查询参数
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// 任务响应，附带按当前时间派生的紧急性视图
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_important: bool,
    pub deadline_at: Option<DateTime<Utc>>,
    pub quadrant: Quadrant,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub user_id: i64,
    pub is_urgent: bool,
    pub days_until_deadline: Option<i64>,
}

impl TaskResponse {
    pub fn from_task(task: Task, now: DateTime<Utc>) -> Self {
        let is_urgent = calculate_urgency(task.deadline_at, now);
        let days = days_until_deadline(task.deadline_at, now);
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            is_important: task.is_important,
            deadline_at: task.deadline_at,
            quadrant: task.quadrant,
            completed: task.completed,
            created_at: task.created_at,
            completed_at: task.completed_at,
            user_id: task.user_id,
            is_urgent,
            days_until_deadline: days,
        }
    }
}

/// 按象限/状态过滤的列表响应
#[derive(Debug, Serialize)]
pub struct FilteredTasksResponse {
    pub filter: String,
    pub count: usize,
    pub tasks: Vec<TaskResponse>,
}

/// 搜索结果响应
#[derive(Debug, Serialize)]
pub struct SearchTasksResponse {
    pub query: String,
    pub count: usize,
    pub tasks: Vec<TaskResponse>,
}

/// 删除结果
#[derive(Debug, Serialize)]
pub struct DeletedTaskResponse {
    pub id: i64,
    pub title: String,
}

fn parse_status(status: &str) -> Result<bool, ApiError> {
    match status {
        "completed" => Ok(true),
        "pending" => Ok(false),
        other => Err(ApiError::BadRequest(format!(
            "无效的状态 '{other}'，请使用 completed 或 pending"
        ))),
    }
}

/// 创建任务
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    validate_title(&request.title)?;
    if let Some(description) = &request.description {
        validate_description(description)?;
    }
    validate_user_id(request.user_id)?;

    let now = Utc::now();
    let task = Task::new(
        request.title,
        request.description,
        request.is_important,
        request.deadline_at,
        request.user_id,
        now,
    );
    let task = state.task_repo.create(&task).await?;

    Ok(created(TaskResponse::from_task(task, now)))
}

/// 获取任务列表（支持过滤和分页）
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskQueryParams>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let mut filter = TaskFilter::default();

    if let Some(quadrant) = &params.quadrant {
        filter.quadrant = Some(Quadrant::from_str(quadrant)?);
    }
    if let Some(status) = &params.status {
        filter.completed = Some(parse_status(status)?);
    }
    filter.user_id = params.user_id;
    if let Some(keyword) = &params.q {
        validate_search_keyword(keyword)?;
        filter.keyword = Some(keyword.clone());
    }

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let total = state.task_repo.count(&filter).await?;

    filter.limit = Some(page_size);
    filter.offset = Some((page - 1) * page_size);
    let tasks = state.task_repo.list(&filter).await?;

    let now = Utc::now();
    let items: Vec<TaskResponse> = tasks
        .into_iter()
        .map(|t| TaskResponse::from_task(t, now))
        .collect();

    Ok(success(PaginatedResponse::new(items, total, page, page_size)))
}

/// 获取单个任务
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let task = state
        .task_repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| TaskMatrixError::task_not_found(id))?;

    Ok(success(TaskResponse::from_task(task, Utc::now())))
}

/// 更新任务
///
/// 重要性或截止时间发生变化时在本次请求内重算象限，
/// 交互式更新的结果对过期的定时重算具有权威性。
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let mut task = state
        .task_repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| TaskMatrixError::task_not_found(id))?;

    if task.completed {
        return Err(ApiError::Conflict(format!("任务 ID {id} 已完成，不允许修改")));
    }

    if let Some(title) = request.title {
        validate_title(&title)?;
        task.title = title;
    }
    if request.description.is_change() {
        if let Some(description) = request.description.value() {
            validate_description(description)?;
        }
        task.description = request.description.apply_to(task.description.take());
    }

    let mut needs_recompute = false;
    if let Some(is_important) = request.is_important {
        if task.is_important != is_important {
            task.is_important = is_important;
            needs_recompute = true;
        }
    }
    if request.deadline_at.is_change() {
        task.deadline_at = request.deadline_at.apply_to(task.deadline_at);
        needs_recompute = true;
    }

    let now = Utc::now();
    if needs_recompute {
        task.recompute_quadrant(now);
    }

    state.task_repo.update(&task).await?;

    Ok(success(TaskResponse::from_task(task, now)))
}

/// 删除任务
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let task = state
        .task_repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| TaskMatrixError::task_not_found(id))?;

    state.task_repo.delete(id).await?;

    Ok(success_with_message(
        DeletedTaskResponse {
            id: task.id,
            title: task.title,
        },
        "任务删除成功".to_string(),
    ))
}

/// 将任务标记为已完成
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let now = Utc::now();
    let task = state.task_repo.mark_completed(id, now).await?;

    Ok(success(TaskResponse::from_task(task, now)))
}

/// 按象限获取任务
pub async fn get_tasks_by_quadrant(
    State(state): State<AppState>,
    Path(quadrant): Path<String>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let quadrant = Quadrant::from_str(&quadrant)?;

    let filter = TaskFilter {
        quadrant: Some(quadrant),
        ..Default::default()
    };
    let tasks = state.task_repo.list(&filter).await?;

    let now = Utc::now();
    let tasks: Vec<TaskResponse> = tasks
        .into_iter()
        .map(|t| TaskResponse::from_task(t, now))
        .collect();

    Ok(success(FilteredTasksResponse {
        filter: quadrant.to_string(),
        count: tasks.len(),
        tasks,
    }))
}

/// 按完成状态获取任务
pub async fn get_tasks_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let completed = parse_status(&status)?;

    let filter = TaskFilter {
        completed: Some(completed),
        ..Default::default()
    };
    let tasks = state.task_repo.list(&filter).await?;

    let now = Utc::now();
    let tasks: Vec<TaskResponse> = tasks
        .into_iter()
        .map(|t| TaskResponse::from_task(t, now))
        .collect();

    Ok(success(FilteredTasksResponse {
        filter: status,
        count: tasks.len(),
        tasks,
    }))
}

/// 按关键词搜索任务（标题和描述）
pub async fn search_tasks(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<impl axum::response::IntoResponse> {
    validate_search_keyword(&params.q)?;

    let filter = TaskFilter {
        keyword: Some(params.q.clone()),
        ..Default::default()
    };
    let tasks = state.task_repo.list(&filter).await?;

    if tasks.is_empty() {
        return Err(ApiError::NotFound);
    }

    let now = Utc::now();
    let tasks: Vec<TaskResponse> = tasks
        .into_iter()
        .map(|t| TaskResponse::from_task(t, now))
        .collect();

    Ok(success(SearchTasksResponse {
        query: params.q,
        count: tasks.len(),
        tasks,
    }))
}
