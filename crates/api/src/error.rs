use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use taskmatrix_errors::TaskMatrixError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("任务系统错误: {0}")]
    Matrix(#[from] TaskMatrixError),

    #[error("验证错误: {0}")]
    Validation(#[from] validator::ValidationError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("请求冲突: {0}")]
    Conflict(String),

    #[error("未找到资源")]
    NotFound,

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::Matrix(TaskMatrixError::TaskNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("任务 ID {} 不存在", id),
                "TASK_NOT_FOUND".to_string(),
                vec![
                    "请检查任务ID是否正确".to_string(),
                    "使用 GET /api/tasks 查看所有任务".to_string(),
                ],
            ),
            ApiError::Matrix(TaskMatrixError::TaskAlreadyCompleted { id }) => (
                StatusCode::CONFLICT,
                format!("任务 ID {} 已经完成", id),
                "TASK_ALREADY_COMPLETED".to_string(),
                vec![
                    "已完成的任务不允许重复完成".to_string(),
                    "使用 GET /api/tasks/{id} 查看任务当前状态".to_string(),
                ],
            ),
            ApiError::Matrix(TaskMatrixError::InvalidQuadrant { value }) => (
                StatusCode::BAD_REQUEST,
                format!("象限标识 '{}' 无效", value),
                "INVALID_QUADRANT".to_string(),
                vec!["可用的象限标识: Q1, Q2, Q3, Q4".to_string()],
            ),
            ApiError::Matrix(TaskMatrixError::InvalidTaskParams(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("任务参数无效: {}", msg),
                "INVALID_TASK_PARAMS".to_string(),
                vec!["请检查任务参数格式是否正确".to_string()],
            ),
            ApiError::Matrix(TaskMatrixError::ValidationError(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("数据验证失败: {}", msg),
                "VALIDATION_ERROR".to_string(),
                vec!["请检查请求参数是否符合要求".to_string()],
            ),
            ApiError::Validation(error) => (
                StatusCode::BAD_REQUEST,
                format!(
                    "参数验证失败: {}",
                    error
                        .message
                        .as_ref()
                        .unwrap_or(&std::borrow::Cow::Borrowed(error.code.as_ref()))
                ),
                "VALIDATION_ERROR".to_string(),
                vec!["请检查请求参数格式".to_string()],
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {}", msg),
                "BAD_REQUEST".to_string(),
                vec![
                    "请检查请求格式和参数".to_string(),
                    "确保Content-Type正确设置".to_string(),
                ],
            ),
            ApiError::Conflict(msg) => (
                StatusCode::CONFLICT,
                format!("资源冲突: {}", msg),
                "CONFLICT".to_string(),
                vec![
                    "请求的操作与当前资源状态冲突".to_string(),
                    "请刷新资源状态后重试".to_string(),
                ],
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "请求的资源不存在".to_string(),
                "NOT_FOUND".to_string(),
                vec![
                    "请检查请求URL或查询条件是否正确".to_string(),
                    "使用 GET /api/tasks 查看所有任务".to_string(),
                ],
            ),
            ApiError::Matrix(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    "查看 GET /api/system/health 检查系统状态".to_string(),
                ],
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    format!("错误详情: {}", msg),
                ],
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
