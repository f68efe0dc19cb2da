use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskMatrixError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("任务未找到: {id}")]
    TaskNotFound { id: i64 },
    #[error("任务已完成，无法重复操作: {id}")]
    TaskAlreadyCompleted { id: i64 },
    #[error("无效的象限标识: {value}")]
    InvalidQuadrant { value: String },
    #[error("无效的任务参数: {0}")]
    InvalidTaskParams(String),
    #[error("数据验证失败: {0}")]
    ValidationError(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("操作超时: {0}")]
    Timeout(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type TaskMatrixResult<T> = Result<T, TaskMatrixError>;

impl TaskMatrixError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn task_not_found(id: i64) -> Self {
        Self::TaskNotFound { id }
    }
    pub fn task_already_completed(id: i64) -> Self {
        Self::TaskAlreadyCompleted { id }
    }
    pub fn invalid_quadrant<S: Into<String>>(value: S) -> Self {
        Self::InvalidQuadrant {
            value: value.into(),
        }
    }
    pub fn invalid_params<S: Into<String>>(msg: S) -> Self {
        Self::InvalidTaskParams(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TaskMatrixError::Internal(_) | TaskMatrixError::Configuration(_)
        )
    }
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TaskMatrixError::Database(_)
                | TaskMatrixError::DatabaseOperation(_)
                | TaskMatrixError::Timeout(_)
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            TaskMatrixError::TaskNotFound { .. } => "请求的任务不存在",
            TaskMatrixError::TaskAlreadyCompleted { .. } => "任务已经完成",
            TaskMatrixError::InvalidQuadrant { .. } => "象限标识无效，请使用 Q1、Q2、Q3 或 Q4",
            TaskMatrixError::InvalidTaskParams(_) => "任务参数配置有误",
            TaskMatrixError::ValidationError(_) => "输入数据验证失败",
            TaskMatrixError::Timeout(_) => "操作超时，请稍后重试",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for TaskMatrixError {
    fn from(err: serde_json::Error) -> Self {
        TaskMatrixError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for TaskMatrixError {
    fn from(err: anyhow::Error) -> Self {
        TaskMatrixError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(
            TaskMatrixError::task_not_found(7),
            TaskMatrixError::TaskNotFound { id: 7 }
        ));
        assert!(matches!(
            TaskMatrixError::task_already_completed(3),
            TaskMatrixError::TaskAlreadyCompleted { id: 3 }
        ));
        assert!(matches!(
            TaskMatrixError::invalid_quadrant("Q9"),
            TaskMatrixError::InvalidQuadrant { .. }
        ));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(TaskMatrixError::DatabaseOperation("连接中断".to_string()).is_retryable());
        assert!(TaskMatrixError::Timeout("查询超时".to_string()).is_retryable());
        assert!(!TaskMatrixError::task_not_found(1).is_retryable());
        assert!(!TaskMatrixError::ValidationError("标题为空".to_string()).is_retryable());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(TaskMatrixError::Configuration("缺少数据库地址".to_string()).is_fatal());
        assert!(!TaskMatrixError::task_not_found(1).is_fatal());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = TaskMatrixError::Internal("stack trace here".to_string());
        assert_eq!(err.user_message(), "系统繁忙，请稍后重试");

        let err = TaskMatrixError::task_not_found(42);
        assert_eq!(err.user_message(), "请求的任务不存在");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: TaskMatrixError = json_err.into();
        assert!(matches!(err, TaskMatrixError::Serialization(_)));
    }
}
