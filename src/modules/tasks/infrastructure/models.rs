/// Diesel models for the anime_load_tasks table
use crate::modules::tasks::domain::entities::{AnimeLoadTask, NewAnimeLoadTask, TaskStatus};
use crate::schema::anime_load_tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Diesel model for inserting new tasks
#[derive(Insertable, Debug)]
#[diesel(table_name = anime_load_tasks)]
pub struct NewTaskModel {
    pub export_job_id: Option<Uuid>,
    pub user_id: Uuid,
    pub mal_id: i32,
    pub mal_title: String,
    pub mal_title_japanese: Option<String>,
    pub mal_title_english: Option<String>,
    pub status: TaskStatus,
    pub priority: i32,
    pub max_attempts: i32,
}

impl From<NewAnimeLoadTask> for NewTaskModel {
    fn from(task: NewAnimeLoadTask) -> Self {
        Self {
            export_job_id: task.export_job_id,
            user_id: task.user_id,
            mal_id: task.mal_id,
            mal_title: task.mal_title,
            mal_title_japanese: task.mal_title_japanese,
            mal_title_english: task.mal_title_english,
            status: TaskStatus::Pending,
            priority: task.priority,
            max_attempts: task.max_attempts,
        }
    }
}

/// Diesel model for querying existing tasks
#[derive(Queryable, Selectable, QueryableByName, Debug, Clone)]
#[diesel(table_name = anime_load_tasks)]
pub struct AnimeLoadTaskModel {
    pub id: Uuid,
    pub export_job_id: Option<Uuid>,
    pub user_id: Uuid,
    pub mal_id: i32,
    pub mal_title: String,
    pub mal_title_japanese: Option<String>,
    pub mal_title_english: Option<String>,
    pub status: TaskStatus,
    pub priority: i32,
    pub attempt_count: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub resolved_shikimori_id: Option<String>,
    pub resolved_anime_id: Option<Uuid>,
    pub resolution_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnimeLoadTaskModel {
    /// Convert to the domain entity
    pub fn into_domain(self) -> AnimeLoadTask {
        AnimeLoadTask {
            id: self.id,
            export_job_id: self.export_job_id,
            user_id: self.user_id,
            mal_id: self.mal_id,
            mal_title: self.mal_title,
            mal_title_japanese: self.mal_title_japanese,
            mal_title_english: self.mal_title_english,
            status: self.status,
            priority: self.priority,
            attempt_count: self.attempt_count,
            max_attempts: self.max_attempts,
            last_error: self.last_error,
            next_retry_at: self.next_retry_at,
            resolved_shikimori_id: self.resolved_shikimori_id,
            resolved_anime_id: self.resolved_anime_id,
            resolution_method: self.resolution_method,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
