//! # TaskMatrix API
//!
//! 艾森豪威尔矩阵任务系统的REST API模块，基于Axum构建。
//!
//! ## API 端点
//!
//! ### 任务管理
//! - `GET /api/tasks` - 获取任务列表（支持象限/状态/用户/关键词过滤和分页）
//! - `POST /api/tasks` - 创建新任务（象限由服务端推导）
//! - `GET /api/tasks/{id}` - 获取任务详情
//! - `PUT /api/tasks/{id}` - 更新任务（重要性/截止时间变化时重算象限）
//! - `DELETE /api/tasks/{id}` - 删除任务
//! - `POST /api/tasks/{id}/complete` - 完成任务（象限冻结）
//! - `GET /api/tasks/search?q=关键词` - 搜索任务
//! - `GET /api/tasks/quadrant/{quadrant}` - 按象限过滤
//! - `GET /api/tasks/status/{status}` - 按完成状态过滤
//!
//! ### 统计
//! - `GET /api/stats` - 按象限和完成状态的总体统计
//! - `GET /api/stats/deadlines` - 临近截止任务概览
//! - `GET /api/stats/users` - 每用户任务数量
//!
//! ### 系统
//! - `GET /health` - 存活检查
//! - `GET /api/system/health` - 就绪检查（含数据库连通性）
//! - `POST /api/system/sweep` - 手动触发一次象限重算
//!
//! ## 响应格式
//!
//! 成功响应统一为 `{"success": true, "data": ..., "timestamp": ...}`，
//! 错误响应为 `{"error": {"message", "type", "code", "suggestions", "timestamp"}}`。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod types;
pub mod validation;

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, trace_layer};
use routes::{create_routes, AppState};
use taskmatrix_application::QuadrantSweepService;
use taskmatrix_domain::repositories::TaskRepository;

/// 创建完整的API应用
pub fn create_app(
    task_repo: Arc<dyn TaskRepository>,
    sweep_service: Arc<QuadrantSweepService>,
) -> Router {
    let state = AppState {
        task_repo,
        sweep_service,
    };

    create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(cors_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use taskmatrix_domain::entities::{Quadrant, Task};
    use taskmatrix_domain::repositories::TaskRepository as _;
    use taskmatrix_testing_utils::mocks::MockTaskRepository;
    use tower::ServiceExt;

    fn test_app() -> (Router, MockTaskRepository) {
        let repo = MockTaskRepository::new();
        let task_repo: Arc<dyn TaskRepository> = Arc::new(repo.clone());
        let sweep_service = Arc::new(QuadrantSweepService::new(task_repo.clone()));
        (create_app(task_repo, sweep_service), repo)
    }

    async fn seed_task(repo: &MockTaskRepository, task: Task) -> Task {
        repo.create(&task).await.unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_and_get_task() {
        let (app, _) = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/tasks",
                serde_json::json!({
                    "title": "交付季度报告",
                    "description": "附上数据图表",
                    "is_important": true,
                    "deadline_at": (Utc::now() + Duration::days(1)).to_rfc3339(),
                    "user_id": 1
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["data"]["quadrant"], "Q1");
        assert_eq!(body["data"]["is_urgent"], true);
        let id = body["data"]["id"].as_i64().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/tasks/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["title"], "交付季度报告");
    }

    #[tokio::test]
    async fn test_create_task_rejects_short_title() {
        let (app, _) = test_app();

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/tasks",
                serde_json::json!({
                    "title": "ab",
                    "is_important": false,
                    "user_id": 1
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_missing_task_returns_404() {
        let (app, _) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/tasks/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "TASK_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_quadrant_returns_400() {
        let (app, _) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/tasks/quadrant/Q9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "INVALID_QUADRANT");
    }

    #[tokio::test]
    async fn test_update_recomputes_quadrant() {
        let (app, repo) = test_app();

        let now = Utc::now();
        // 重要但不紧急：Q2
        let task = Task::new(
            "准备年度规划".to_string(),
            None,
            true,
            Some(now + Duration::days(30)),
            1,
            now,
        );
        let task = seed_task(&repo, task).await;
        assert_eq!(task.quadrant, Quadrant::Q2);

        // 截止时间提前到明天后应重算为Q1
        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/api/tasks/{}", task.id),
                serde_json::json!({
                    "deadline_at": (now + Duration::days(1)).to_rfc3339()
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["quadrant"], "Q1");
    }

    #[tokio::test]
    async fn test_update_clears_deadline_with_null() {
        let (app, repo) = test_app();

        let now = Utc::now();
        let task = Task::new(
            "提交报销单".to_string(),
            None,
            true,
            Some(now + Duration::days(1)),
            1,
            now,
        );
        let task = seed_task(&repo, task).await;
        assert_eq!(task.quadrant, Quadrant::Q1);

        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/api/tasks/{}", task.id),
                serde_json::json!({ "deadline_at": null }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        // 清空截止时间后不再紧急，回到Q2
        assert_eq!(body["data"]["quadrant"], "Q2");
        assert!(body["data"]["deadline_at"].is_null());
    }

    #[tokio::test]
    async fn test_complete_task_twice_conflicts() {
        let (app, repo) = test_app();

        let task = seed_task(
            &repo,
            Task::new("一次性任务".to_string(), None, false, None, 1, Utc::now()),
        )
        .await;

        let uri = format!("/api/tasks/{}/complete", task.id);
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(&uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["completed"], true);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(&uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_search_without_match_returns_404() {
        let (app, _) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/tasks/search?q=%E4%B8%8D%E5%AD%98%E5%9C%A8")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let (app, repo) = test_app();

        let now = Utc::now();
        seed_task(
            &repo,
            Task::new("重要紧急".to_string(), None, true, Some(now), 1, now),
        )
        .await;
        seed_task(
            &repo,
            Task::new("无关紧要".to_string(), None, false, None, 2, now),
        )
        .await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["total_tasks"], 2);
        assert_eq!(body["data"]["by_quadrant"]["Q1"], 1);
        assert_eq!(body["data"]["by_quadrant"]["Q4"], 1);
        assert_eq!(body["data"]["by_status"]["pending"], 2);
    }

    #[tokio::test]
    async fn test_manual_sweep_endpoint() {
        let (app, repo) = test_app();

        let now = Utc::now();
        // 存入一个象限过期的任务
        let mut task = Task::new(
            "象限过期的任务".to_string(),
            None,
            true,
            Some(now + Duration::days(1)),
            1,
            now,
        );
        task.quadrant = Quadrant::Q2;
        seed_task(&repo, task).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/system/sweep")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["scanned"], 1);
        assert_eq!(body["data"]["updated"], 1);
    }

}
