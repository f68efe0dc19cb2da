use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use taskmatrix_domain::entities::{Quadrant, Task, TaskFilter};
use taskmatrix_domain::matrix::{calculate_urgency, define_quadrant};
use taskmatrix_domain::repositories::{
    QuadrantCounts, StatusCounts, SweepReport, TaskRepository, TaskStats, UserTaskCount,
};
use taskmatrix_errors::{TaskMatrixError, TaskMatrixResult};

/// TaskRepository的内存Mock实现
#[derive(Debug, Clone)]
pub struct MockTaskRepository {
    tasks: Arc<Mutex<HashMap<i64, Task>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockTaskRepository {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let mut task_map = HashMap::new();
        let mut max_id = 0;

        for task in tasks {
            if task.id > max_id {
                max_id = task.id;
            }
            task_map.insert(task.id, task);
        }

        Self {
            tasks: Arc::new(Mutex::new(task_map)),
            next_id: Arc::new(Mutex::new(max_id + 1)),
        }
    }

    pub fn clear(&self) {
        self.tasks.lock().unwrap().clear();
        *self.next_id.lock().unwrap() = 1;
    }

    pub fn task_count(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// 按ID升序返回全部任务
    pub fn get_all_tasks(&self) -> Vec<Task> {
        let tasks = self.tasks.lock().unwrap();
        let mut all: Vec<Task> = tasks.values().cloned().collect();
        all.sort_by_key(|t| t.id);
        all
    }

    fn matches(task: &Task, filter: &TaskFilter) -> bool {
        // 与PostgresTaskRepository的WHERE语义保持一致

        if let Some(quadrant) = filter.quadrant {
            if task.quadrant != quadrant {
                return false;
            }
        }
        if let Some(completed) = filter.completed {
            if task.completed != completed {
                return false;
            }
        }
        if let Some(user_id) = filter.user_id {
            if task.user_id != user_id {
                return false;
            }
        }
        if let Some(keyword) = &filter.keyword {
            let keyword = keyword.to_lowercase();
            let title_match = task.title.to_lowercase().contains(&keyword);
            let description_match = task
                .description
                .as_ref()
                .map(|d| d.to_lowercase().contains(&keyword))
                .unwrap_or(false);
            if !title_match && !description_match {
                return false;
            }
        }
        true
    }
}

impl Default for MockTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn create(&self, task: &Task) -> TaskMatrixResult<Task> {
        let mut tasks = self.tasks.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();

        let mut new_task = task.clone();
        new_task.id = *next_id;
        *next_id += 1;

        tasks.insert(new_task.id, new_task.clone());
        Ok(new_task)
    }

    async fn get_by_id(&self, id: i64) -> TaskMatrixResult<Option<Task>> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.get(&id).cloned())
    }

    async fn update(&self, task: &Task) -> TaskMatrixResult<()> {
        let mut tasks = self.tasks.lock().unwrap();
        if !tasks.contains_key(&task.id) {
            return Err(TaskMatrixError::task_not_found(task.id));
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> TaskMatrixResult<()> {
        let mut tasks = self.tasks.lock().unwrap();
        if tasks.remove(&id).is_none() {
            return Err(TaskMatrixError::task_not_found(id));
        }
        Ok(())
    }

    async fn list(&self, filter: &TaskFilter) -> TaskMatrixResult<Vec<Task>> {
        let tasks = self.tasks.lock().unwrap();
        let mut filtered: Vec<Task> = tasks
            .values()
            .filter(|t| Self::matches(t, filter))
            .cloned()
            .collect();
        filtered.sort_by_key(|t| t.id);

        if let Some(offset) = filter.offset {
            filtered = filtered.into_iter().skip(offset as usize).collect();
        }
        if let Some(limit) = filter.limit {
            filtered.truncate(limit as usize);
        }

        Ok(filtered)
    }

    async fn count(&self, filter: &TaskFilter) -> TaskMatrixResult<i64> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.values().filter(|t| Self::matches(t, filter)).count() as i64)
    }

    async fn mark_completed(
        &self,
        id: i64,
        completed_at: DateTime<Utc>,
    ) -> TaskMatrixResult<Task> {
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| TaskMatrixError::task_not_found(id))?;

        if task.completed {
            return Err(TaskMatrixError::task_already_completed(id));
        }

        task.completed = true;
        task.completed_at = Some(completed_at);
        Ok(task.clone())
    }

    async fn get_stats(&self) -> TaskMatrixResult<TaskStats> {
        let tasks = self.tasks.lock().unwrap();
        let mut by_quadrant = QuadrantCounts::default();
        let mut by_status = StatusCounts::default();

        for task in tasks.values() {
            match task.quadrant {
                Quadrant::Q1 => by_quadrant.q1 += 1,
                Quadrant::Q2 => by_quadrant.q2 += 1,
                Quadrant::Q3 => by_quadrant.q3 += 1,
                Quadrant::Q4 => by_quadrant.q4 += 1,
            }
            if task.completed {
                by_status.completed += 1;
            } else {
                by_status.pending += 1;
            }
        }

        Ok(TaskStats {
            total_tasks: tasks.len() as i64,
            by_quadrant,
            by_status,
        })
    }

    async fn list_open_with_deadline(&self) -> TaskMatrixResult<Vec<Task>> {
        let tasks = self.tasks.lock().unwrap();
        let mut open: Vec<Task> = tasks
            .values()
            .filter(|t| !t.completed && t.deadline_at.is_some())
            .cloned()
            .collect();
        open.sort_by_key(|t| t.deadline_at);
        Ok(open)
    }

    async fn count_by_user(&self) -> TaskMatrixResult<Vec<UserTaskCount>> {
        let tasks = self.tasks.lock().unwrap();
        let mut counts: HashMap<i64, i64> = HashMap::new();
        for task in tasks.values() {
            *counts.entry(task.user_id).or_insert(0) += 1;
        }

        let mut result: Vec<UserTaskCount> = counts
            .into_iter()
            .map(|(user_id, tasks_count)| UserTaskCount {
                user_id,
                tasks_count,
            })
            .collect();
        result.sort_by_key(|c| c.user_id);
        Ok(result)
    }

    async fn recompute_open_quadrants(
        &self,
        now: DateTime<Utc>,
    ) -> TaskMatrixResult<SweepReport> {
        let mut tasks = self.tasks.lock().unwrap();
        let mut scanned = 0;
        let mut updated = 0u64;

        for task in tasks.values_mut().filter(|t| !t.completed) {
            scanned += 1;
            let next = define_quadrant(
                task.is_important,
                calculate_urgency(task.deadline_at, now),
            );
            if next != task.quadrant {
                task.quadrant = next;
                updated += 1;
            }
        }

        Ok(SweepReport { scanned, updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_task(title: &str, is_important: bool, user_id: i64) -> Task {
        Task::new(title.to_string(), None, is_important, None, user_id, Utc::now())
    }

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let repo = MockTaskRepository::new();
        let a = repo.create(&sample_task("任务一", true, 1)).await.unwrap();
        let b = repo.create(&sample_task("任务二", false, 1)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.task_count(), 2);
    }

    #[tokio::test]
    async fn test_list_applies_filters() {
        let now = Utc::now();
        let repo = MockTaskRepository::new();
        repo.create(&Task::new(
            "给客户发送报价".to_string(),
            Some("附上合同草稿".to_string()),
            true,
            Some(now + Duration::days(1)),
            1,
            now,
        ))
        .await
        .unwrap();
        repo.create(&sample_task("整理照片", false, 2)).await.unwrap();

        let filter = TaskFilter {
            quadrant: Some(Quadrant::Q1),
            ..Default::default()
        };
        assert_eq!(repo.list(&filter).await.unwrap().len(), 1);

        let filter = TaskFilter {
            keyword: Some("合同".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(&filter).await.unwrap().len(), 1);

        let filter = TaskFilter {
            user_id: Some(2),
            ..Default::default()
        };
        let result = repo.list(&filter).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "整理照片");
    }

    #[tokio::test]
    async fn test_mark_completed_transitions() {
        let repo = MockTaskRepository::new();
        let task = repo.create(&sample_task("一次性任务", true, 1)).await.unwrap();

        let done = repo.mark_completed(task.id, Utc::now()).await.unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());

        // 重复完成报错
        let err = repo.mark_completed(task.id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, TaskMatrixError::TaskAlreadyCompleted { .. }));

        let err = repo.mark_completed(999, Utc::now()).await.unwrap_err();
        assert!(matches!(err, TaskMatrixError::TaskNotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_stats_counts() {
        let repo = MockTaskRepository::new();
        repo.create(&sample_task("重要的事", true, 1)).await.unwrap();
        let t = repo.create(&sample_task("琐事", false, 1)).await.unwrap();
        repo.mark_completed(t.id, Utc::now()).await.unwrap();

        let stats = repo.get_stats().await.unwrap();
        assert_eq!(stats.total_tasks, 2);
        assert_eq!(stats.by_quadrant.q2, 1);
        assert_eq!(stats.by_quadrant.q4, 1);
        assert_eq!(stats.by_status.completed, 1);
        assert_eq!(stats.by_status.pending, 1);
    }

    #[tokio::test]
    async fn test_count_by_user() {
        let repo = MockTaskRepository::new();
        repo.create(&sample_task("a", true, 1)).await.unwrap();
        repo.create(&sample_task("b", true, 1)).await.unwrap();
        repo.create(&sample_task("c", false, 2)).await.unwrap();

        let counts = repo.count_by_user().await.unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].user_id, 1);
        assert_eq!(counts[0].tasks_count, 2);
        assert_eq!(counts[1].tasks_count, 1);
    }
}
