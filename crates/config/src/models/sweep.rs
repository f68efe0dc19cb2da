use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

/// 象限重算扫描的触发配置
///
/// 两个触发器共用同一个扫描入口：固定间隔循环保证响应性，
/// 每日cron触发保证至少一次全量重算。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub enabled: bool,
    /// 间隔触发的周期（秒）
    pub interval_seconds: u64,
    /// 每日触发的cron表达式（6字段，秒在首位）
    pub daily_cron: String,
}

impl ConfigValidator for SweepConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_timeout_seconds(self.interval_seconds)?;
        ValidationUtils::validate_cron_expression(&self.daily_cron, "sweep.daily_cron")?;
        Ok(())
    }
}
