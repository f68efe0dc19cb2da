use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

use taskmatrix_domain::repositories::{SweepReport, TaskRepository};
use taskmatrix_errors::TaskMatrixResult;

/// 象限重算服务 - 保持未完成任务的象限与时变的紧急性一致
///
/// 定时循环、每日触发和手动触发接口共用`run_once`这一个入口，
/// 服务本身不拥有任何定时逻辑。
pub struct QuadrantSweepService {
    task_repo: Arc<dyn TaskRepository>,
}

impl QuadrantSweepService {
    /// 创建新的象限重算服务实例
    pub fn new(task_repo: Arc<dyn TaskRepository>) -> Self {
        Self { task_repo }
    }

    /// 执行一次全量重算
    ///
    /// 事务性由仓储保证：要么全部变更落库，要么全部回滚。
    pub async fn run_once(&self) -> TaskMatrixResult<SweepReport> {
        let span = tracing::info_span!("quadrant_sweep");
        let _guard = span.enter();

        let now = Utc::now();
        info!("开始重算未完成任务的象限");

        let report = self.task_repo.recompute_open_quadrants(now).await?;

        if report.updated > 0 {
            info!(
                "象限重算完成: 扫描 {} 个，更新 {} 个",
                report.scanned, report.updated
            );
        } else {
            info!("象限重算完成: 扫描 {} 个，无变化", report.scanned);
        }

        Ok(report)
    }

    /// 定时触发用的入口：失败只记录日志，等待下一次调度
    pub async fn run_scheduled(&self) {
        if let Err(e) = self.run_once().await {
            error!("象限重算失败，等待下次调度: {}", e);
        }
    }
}
