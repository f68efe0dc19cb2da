use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use taskmatrix_application::QuadrantSweepService;
use taskmatrix_domain::repositories::TaskRepository;

use crate::handlers::{
    health::health_check,
    stats::{get_deadline_stats, get_stats, get_user_stats},
    system::{get_system_health, trigger_sweep},
    tasks::{
        complete_task, create_task, delete_task, get_task, get_tasks_by_quadrant,
        get_tasks_by_status, list_tasks, search_tasks, update_task,
    },
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub task_repo: Arc<dyn TaskRepository>,
    pub sweep_service: Arc<QuadrantSweepService>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 任务管理API
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/search", get(search_tasks))
        .route("/api/tasks/quadrant/{quadrant}", get(get_tasks_by_quadrant))
        .route("/api/tasks/status/{status}", get(get_tasks_by_status))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/complete", post(complete_task))
        // 统计API
        .route("/api/stats", get(get_stats))
        .route("/api/stats/deadlines", get(get_deadline_stats))
        .route("/api/stats/users", get(get_user_stats))
        // 系统API
        .route("/api/system/health", get(get_system_health))
        .route("/api/system/sweep", post(trigger_sweep))
        .with_state(state)
}
