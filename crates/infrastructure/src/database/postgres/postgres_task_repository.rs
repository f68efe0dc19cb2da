use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{debug, info, instrument};

use taskmatrix_domain::entities::{Quadrant, Task, TaskFilter};
use taskmatrix_domain::matrix::{calculate_urgency, define_quadrant};
use taskmatrix_domain::repositories::{
    QuadrantCounts, StatusCounts, SweepReport, TaskRepository, TaskStats, UserTaskCount,
};
use taskmatrix_errors::{TaskMatrixError, TaskMatrixResult};

const TASK_COLUMNS: &str = "id, title, description, is_important, deadline_at, quadrant, \
                            completed, created_at, completed_at, user_id";

/// 列表查询的动态绑定参数
enum QueryParam {
    Bool(bool),
    Int64(i64),
    String(String),
    Quadrant(Quadrant),
}

pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &sqlx::postgres::PgRow) -> TaskMatrixResult<Task> {
        Ok(Task {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            is_important: row.try_get("is_important")?,
            deadline_at: row.try_get("deadline_at")?,
            quadrant: row.try_get("quadrant")?,
            completed: row.try_get("completed")?,
            created_at: row.try_get("created_at")?,
            completed_at: row.try_get("completed_at")?,
            user_id: row.try_get("user_id")?,
        })
    }

    /// 按过滤器拼接WHERE子句，返回SQL片段和待绑定参数
    fn build_filter_clause(filter: &TaskFilter) -> (String, Vec<QueryParam>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(quadrant) = filter.quadrant {
            params.push(QueryParam::Quadrant(quadrant));
            conditions.push(format!("quadrant = ${}", params.len()));
        }
        if let Some(completed) = filter.completed {
            params.push(QueryParam::Bool(completed));
            conditions.push(format!("completed = ${}", params.len()));
        }
        if let Some(user_id) = filter.user_id {
            params.push(QueryParam::Int64(user_id));
            conditions.push(format!("user_id = ${}", params.len()));
        }
        if let Some(keyword) = &filter.keyword {
            params.push(QueryParam::String(format!("%{keyword}%")));
            let idx = params.len();
            conditions.push(format!(
                "(title ILIKE ${idx} OR description ILIKE ${idx})"
            ));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        (clause, params)
    }

    fn bind_params<'q>(
        mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
        params: &'q [QueryParam],
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        for param in params.iter() {
            query = match param {
                QueryParam::Bool(value) => query.bind(*value),
                QueryParam::Int64(value) => query.bind(*value),
                QueryParam::String(value) => query.bind(value.as_str()),
                QueryParam::Quadrant(value) => query.bind(*value),
            };
        }
        query
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    #[instrument(skip(self, task), fields(task_title = %task.title, user_id = %task.user_id))]
    async fn create(&self, task: &Task) -> TaskMatrixResult<Task> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO tasks (title, description, is_important, deadline_at, quadrant, completed, created_at, completed_at, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_important)
        .bind(task.deadline_at)
        .bind(task.quadrant)
        .bind(task.completed)
        .bind(task.created_at)
        .bind(task.completed_at)
        .bind(task.user_id)
        .fetch_one(&self.pool)
        .await?;

        let created = Self::row_to_task(&row)?;
        info!("创建任务成功: {}", created.entity_description());
        Ok(created)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn get_by_id(&self, id: i64) -> TaskMatrixResult<Option<Task>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let task = Self::row_to_task(&row)?;
                debug!("查询任务成功: ID {}, 标题: {}", task.id, task.title);
                Ok(Some(task))
            }
            None => {
                debug!("查询任务不存在: ID {}", id);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, task), fields(task_id = %task.id, task_title = %task.title))]
    async fn update(&self, task: &Task) -> TaskMatrixResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, is_important = $4, deadline_at = $5,
                quadrant = $6, completed = $7, completed_at = $8
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_important)
        .bind(task.deadline_at)
        .bind(task.quadrant)
        .bind(task.completed)
        .bind(task.completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TaskMatrixError::task_not_found(task.id));
        }

        debug!("更新任务成功: {}", task.entity_description());
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn delete(&self, id: i64) -> TaskMatrixResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskMatrixError::task_not_found(id));
        }

        info!("删除任务成功: ID {}", id);
        Ok(())
    }

    #[instrument(skip(self, filter), fields(
        quadrant = ?filter.quadrant,
        completed = ?filter.completed,
        keyword = ?filter.keyword,
    ))]
    async fn list(&self, filter: &TaskFilter) -> TaskMatrixResult<Vec<Task>> {
        let (clause, params) = Self::build_filter_clause(filter);
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks{clause} ORDER BY id");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = filter.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let query = Self::bind_params(sqlx::query(&sql), &params);
        let rows = query.fetch_all(&self.pool).await?;

        let tasks: TaskMatrixResult<Vec<Task>> = rows.iter().map(Self::row_to_task).collect();
        let tasks = tasks?;
        debug!("查询任务列表成功，返回 {} 个任务", tasks.len());
        Ok(tasks)
    }

    async fn count(&self, filter: &TaskFilter) -> TaskMatrixResult<i64> {
        let (clause, params) = Self::build_filter_clause(filter);
        let sql = format!("SELECT COUNT(*) AS total FROM tasks{clause}");

        let query = Self::bind_params(sqlx::query(&sql), &params);
        let row = query.fetch_one(&self.pool).await?;
        Ok(row.try_get("total")?)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn mark_completed(
        &self,
        id: i64,
        completed_at: DateTime<Utc>,
    ) -> TaskMatrixResult<Task> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE tasks
            SET completed = TRUE, completed_at = $2
            WHERE id = $1 AND completed = FALSE
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(completed_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let task = Self::row_to_task(&row)?;
                info!("任务已完成: {}", task.entity_description());
                Ok(task)
            }
            // 区分"不存在"和"已完成"
            None => match self.get_by_id(id).await? {
                Some(_) => Err(TaskMatrixError::task_already_completed(id)),
                None => Err(TaskMatrixError::task_not_found(id)),
            },
        }
    }

    async fn get_stats(&self) -> TaskMatrixResult<TaskStats> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE quadrant = 'Q1') AS q1,
                   COUNT(*) FILTER (WHERE quadrant = 'Q2') AS q2,
                   COUNT(*) FILTER (WHERE quadrant = 'Q3') AS q3,
                   COUNT(*) FILTER (WHERE quadrant = 'Q4') AS q4,
                   COUNT(*) FILTER (WHERE completed) AS completed,
                   COUNT(*) FILTER (WHERE NOT completed) AS pending
            FROM tasks
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(TaskStats {
            total_tasks: row.try_get("total")?,
            by_quadrant: QuadrantCounts {
                q1: row.try_get("q1")?,
                q2: row.try_get("q2")?,
                q3: row.try_get("q3")?,
                q4: row.try_get("q4")?,
            },
            by_status: StatusCounts {
                completed: row.try_get("completed")?,
                pending: row.try_get("pending")?,
            },
        })
    }

    async fn list_open_with_deadline(&self) -> TaskMatrixResult<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE completed = FALSE AND deadline_at IS NOT NULL \
             ORDER BY deadline_at",
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_task).collect()
    }

    async fn count_by_user(&self) -> TaskMatrixResult<Vec<UserTaskCount>> {
        let rows = sqlx::query(
            "SELECT user_id, COUNT(*) AS tasks_count FROM tasks GROUP BY user_id ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(UserTaskCount {
                    user_id: row.try_get("user_id")?,
                    tasks_count: row.try_get("tasks_count")?,
                })
            })
            .collect()
    }

    /// 整个扫描在一个事务内完成：加行锁读出未完成任务，逐个重算象限，
    /// 只对发生变化的行执行UPDATE。事务中途失败则全部回滚，
    /// 下一次定时触发重新来过。
    #[instrument(skip(self))]
    async fn recompute_open_quadrants(
        &self,
        now: DateTime<Utc>,
    ) -> TaskMatrixResult<SweepReport> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            "SELECT id, is_important, deadline_at, quadrant FROM tasks \
             WHERE completed = FALSE FOR UPDATE",
        )
        .fetch_all(&mut *tx)
        .await?;

        let scanned = rows.len();
        let mut updated = 0u64;

        for row in &rows {
            let id: i64 = row.try_get("id")?;
            let is_important: bool = row.try_get("is_important")?;
            let deadline_at: Option<DateTime<Utc>> = row.try_get("deadline_at")?;
            let current: Quadrant = row.try_get("quadrant")?;

            let next = define_quadrant(is_important, calculate_urgency(deadline_at, now));
            if next != current {
                // completed条件兜底：并发完成的任务以完成态为准
                sqlx::query(
                    "UPDATE tasks SET quadrant = $2 WHERE id = $1 AND completed = FALSE",
                )
                .bind(id)
                .bind(next)
                .execute(&mut *tx)
                .await?;
                debug!("任务 {} 象限变更: {} -> {}", id, current, next);
                updated += 1;
            }
        }

        tx.commit().await?;

        Ok(SweepReport { scanned, updated })
    }
}
