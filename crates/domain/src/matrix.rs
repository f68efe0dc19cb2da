//! 艾森豪威尔矩阵的纯分类逻辑
//!
//! 两个全函数：按截止时间推导紧急性，按重要性×紧急性推导象限。
//! 不访问时钟，当前时间一律由调用方传入。

use chrono::{DateTime, Utc};

use crate::entities::Quadrant;

/// 紧急窗口：截止时间距当前不足该天数（按整天截断）即视为紧急
pub const URGENT_WINDOW_DAYS: i64 = 3;

/// 根据截止时间计算任务是否紧急
///
/// 没有截止时间的任务永远不紧急。剩余时长按整天截断，
/// 即距截止还有3天23小时时剩余天数为3，仍视为紧急。
pub fn calculate_urgency(deadline_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match deadline_at {
        None => false,
        Some(deadline) => (deadline - now).num_days() <= URGENT_WINDOW_DAYS,
    }
}

/// 按重要性和紧急性确定象限
pub fn define_quadrant(is_important: bool, is_urgent: bool) -> Quadrant {
    match (is_important, is_urgent) {
        (true, true) => Quadrant::Q1,
        (true, false) => Quadrant::Q2,
        (false, true) => Quadrant::Q3,
        (false, false) => Quadrant::Q4,
    }
}

/// 距截止时间的整天数，无截止时间时返回None
pub fn days_until_deadline(
    deadline_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    deadline_at.map(|deadline| (deadline - now).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_define_quadrant_full_table() {
        assert_eq!(define_quadrant(true, true), Quadrant::Q1);
        assert_eq!(define_quadrant(true, false), Quadrant::Q2);
        assert_eq!(define_quadrant(false, true), Quadrant::Q3);
        assert_eq!(define_quadrant(false, false), Quadrant::Q4);
    }

    #[test]
    fn test_no_deadline_is_never_urgent() {
        let now = Utc::now();
        assert!(!calculate_urgency(None, now));
    }

    #[test]
    fn test_urgency_boundary_at_three_days() {
        let now = Utc::now();
        // 恰好3天：紧急
        assert!(calculate_urgency(Some(now + Duration::days(3)), now));
        // 4天：不紧急
        assert!(!calculate_urgency(Some(now + Duration::days(4)), now));
    }

    #[test]
    fn test_urgency_truncates_partial_days() {
        let now = Utc::now();
        // 3天23小时按整天截断为3天，仍紧急
        let deadline = now + Duration::days(3) + Duration::hours(23);
        assert!(calculate_urgency(Some(deadline), now));
    }

    #[test]
    fn test_past_deadline_is_urgent() {
        let now = Utc::now();
        assert!(calculate_urgency(Some(now - Duration::days(2)), now));
    }

    #[test]
    fn test_days_until_deadline() {
        let now = Utc::now();
        assert_eq!(days_until_deadline(None, now), None);
        assert_eq!(
            days_until_deadline(Some(now + Duration::days(5)), now),
            Some(5)
        );
        assert_eq!(
            days_until_deadline(Some(now + Duration::hours(30)), now),
            Some(1)
        );
    }
}
