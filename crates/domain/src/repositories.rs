//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Task, TaskFilter};
use taskmatrix_errors::TaskMatrixResult;

/// 按象限统计的任务数量
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuadrantCounts {
    #[serde(rename = "Q1")]
    pub q1: i64,
    #[serde(rename = "Q2")]
    pub q2: i64,
    #[serde(rename = "Q3")]
    pub q3: i64,
    #[serde(rename = "Q4")]
    pub q4: i64,
}

/// 按完成状态统计的任务数量
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub completed: i64,
    pub pending: i64,
}

/// 任务总体统计
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total_tasks: i64,
    pub by_quadrant: QuadrantCounts,
    pub by_status: StatusCounts,
}

/// 单个用户的任务数量
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserTaskCount {
    pub user_id: i64,
    pub tasks_count: i64,
}

/// 一次象限重算的结果
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepReport {
    /// 本次扫描的未完成任务数
    pub scanned: usize,
    /// 象限实际发生变化并写回的任务数
    pub updated: u64,
}

/// 任务仓储抽象
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> TaskMatrixResult<Task>;
    async fn get_by_id(&self, id: i64) -> TaskMatrixResult<Option<Task>>;
    async fn update(&self, task: &Task) -> TaskMatrixResult<()>;
    async fn delete(&self, id: i64) -> TaskMatrixResult<()>;
    async fn list(&self, filter: &TaskFilter) -> TaskMatrixResult<Vec<Task>>;
    async fn count(&self, filter: &TaskFilter) -> TaskMatrixResult<i64>;

    /// 将任务置为完成态并记录完成时间，象限自此冻结。
    /// 任务不存在返回TaskNotFound，已完成返回TaskAlreadyCompleted。
    async fn mark_completed(&self, id: i64, completed_at: DateTime<Utc>)
        -> TaskMatrixResult<Task>;

    async fn get_stats(&self) -> TaskMatrixResult<TaskStats>;

    /// 未完成且带截止时间的任务，按截止时间升序
    async fn list_open_with_deadline(&self) -> TaskMatrixResult<Vec<Task>>;

    async fn count_by_user(&self) -> TaskMatrixResult<Vec<UserTaskCount>>;

    /// 在单个事务内对全部未完成任务重算象限，只写回发生变化的行。
    /// 任何持久化失败都会回滚整个事务，本次扫描不产生部分更新。
    async fn recompute_open_quadrants(&self, now: DateTime<Utc>)
        -> TaskMatrixResult<SweepReport>;
}
