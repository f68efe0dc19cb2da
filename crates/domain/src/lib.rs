//! 领域模型与核心分类逻辑
//!
//! 包含任务实体、艾森豪威尔矩阵的纯分类函数以及数据访问的抽象接口。

pub mod entities;
pub mod matrix;
pub mod repositories;

pub use entities::{Quadrant, Task, TaskFilter};
pub use matrix::{calculate_urgency, days_until_deadline, define_quadrant, URGENT_WINDOW_DAYS};
pub use repositories::{
    QuadrantCounts, StatusCounts, SweepReport, TaskRepository, TaskStats, UserTaskCount,
};
