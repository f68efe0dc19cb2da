use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use taskmatrix_errors::TaskMatrixError;

use crate::matrix::{calculate_urgency, define_quadrant};

/// 艾森豪威尔矩阵象限
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// 重要且紧急
    #[serde(rename = "Q1")]
    Q1,
    /// 重要不紧急
    #[serde(rename = "Q2")]
    Q2,
    /// 紧急不重要
    #[serde(rename = "Q3")]
    Q3,
    /// 不重要不紧急
    #[serde(rename = "Q4")]
    Q4,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::Q1, Quadrant::Q2, Quadrant::Q3, Quadrant::Q4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::Q1 => "Q1",
            Quadrant::Q2 => "Q2",
            Quadrant::Q3 => "Q3",
            Quadrant::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quadrant {
    type Err = TaskMatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Q1" => Ok(Quadrant::Q1),
            "Q2" => Ok(Quadrant::Q2),
            "Q3" => Ok(Quadrant::Q3),
            "Q4" => Ok(Quadrant::Q4),
            other => Err(TaskMatrixError::invalid_quadrant(other)),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for Quadrant {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("VARCHAR")
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Quadrant {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Quadrant::from_str(s).map_err(|_| format!("Invalid quadrant: {s}").into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Quadrant {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

/// 任务实体
///
/// `quadrant` 是派生字段：未完成任务始终满足
/// `quadrant == define_quadrant(is_important, calculate_urgency(deadline_at, now))`，
/// 完成后象限冻结，不再参与重算。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
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
}

impl Task {
    /// 创建新任务，象限在创建时即按当前时间推导
    pub fn new(
        title: String,
        description: Option<String>,
        is_important: bool,
        deadline_at: Option<DateTime<Utc>>,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let quadrant = define_quadrant(is_important, calculate_urgency(deadline_at, now));
        Self {
            id: 0, // 将由数据库生成
            title,
            description,
            is_important,
            deadline_at,
            quadrant,
            completed: false,
            created_at: now,
            completed_at: None,
            user_id,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.completed
    }

    /// 按当前时间重算象限，已完成任务保持不变
    pub fn recompute_quadrant(&mut self, now: DateTime<Utc>) {
        if self.completed {
            return;
        }
        self.quadrant = define_quadrant(
            self.is_important,
            calculate_urgency(self.deadline_at, now),
        );
    }

    pub fn entity_description(&self) -> String {
        format!(
            "任务 '{}' (ID: {}, 象限: {})",
            self.title, self.id, self.quadrant
        )
    }
}

/// 任务列表查询过滤器
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub quadrant: Option<Quadrant>,
    pub completed: Option<bool>,
    pub user_id: Option<i64>,
    /// 标题/描述的不区分大小写子串匹配
    pub keyword: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_quadrant_round_trip() {
        for q in Quadrant::ALL {
            assert_eq!(Quadrant::from_str(q.as_str()).unwrap(), q);
        }
        assert!(Quadrant::from_str("Q5").is_err());
        assert!(Quadrant::from_str("q1").is_err());
    }

    #[test]
    fn test_quadrant_json_representation() {
        let json = serde_json::to_string(&Quadrant::Q3).unwrap();
        assert_eq!(json, "\"Q3\"");
        let parsed: Quadrant = serde_json::from_str("\"Q2\"").unwrap();
        assert_eq!(parsed, Quadrant::Q2);
    }

    #[test]
    fn test_new_task_derives_quadrant() {
        let now = Utc::now();
        let task = Task::new(
            "写周报".to_string(),
            None,
            true,
            Some(now + Duration::days(1)),
            1,
            now,
        );
        assert_eq!(task.quadrant, Quadrant::Q1);
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.created_at, now);

        let task = Task::new("读书".to_string(), None, false, None, 1, now);
        assert_eq!(task.quadrant, Quadrant::Q4);
    }

    #[test]
    fn test_recompute_quadrant_skips_completed() {
        let now = Utc::now();
        let mut task = Task::new(
            "交付报告".to_string(),
            None,
            true,
            Some(now + Duration::days(10)),
            1,
            now,
        );
        assert_eq!(task.quadrant, Quadrant::Q2);

        // 截止时间临近后重算，进入Q1
        let later = now + Duration::days(8);
        task.recompute_quadrant(later);
        assert_eq!(task.quadrant, Quadrant::Q1);

        // 完成后象限冻结
        task.completed = true;
        task.deadline_at = None;
        task.recompute_quadrant(later);
        assert_eq!(task.quadrant, Quadrant::Q1);
    }
}
