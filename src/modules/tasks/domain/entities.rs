/// Domain entities for the anime load task queue
///
/// A task is one unit of work inside a MAL export: resolve one MAL id to a
/// Shikimori id and make sure the anime exists in the local catalog.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task status enum matching the `task_status` database type
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::TaskStatus"]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Skipped,
    /// Requires user intervention; no exact title match was found
    Manual,
}

impl TaskStatus {
    /// Terminal statuses are monotonic: once reached, no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped | TaskStatus::Manual
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Skipped => write!(f, "skipped"),
            TaskStatus::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            "skipped" => Ok(TaskStatus::Skipped),
            "manual" => Ok(TaskStatus::Manual),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

/// How a MAL id was resolved to a Shikimori id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// Served from the mapping cache or the local catalog
    Cached,
    /// Remote search returned an exact Japanese-title match
    ExactJapanese,
    /// Remote search returned an exact romanized-title match
    ExactRomanized,
    /// Chosen by the user through the manual-resolution API
    UserSelected,
    /// No exact match; user intervention required
    NotFound,
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionMethod::Cached => write!(f, "cached"),
            ResolutionMethod::ExactJapanese => write!(f, "exact_japanese"),
            ResolutionMethod::ExactRomanized => write!(f, "exact_romanized"),
            ResolutionMethod::UserSelected => write!(f, "user_selected"),
            ResolutionMethod::NotFound => write!(f, "not_found"),
        }
    }
}

impl std::str::FromStr for ResolutionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cached" => Ok(ResolutionMethod::Cached),
            "exact_japanese" => Ok(ResolutionMethod::ExactJapanese),
            "exact_romanized" => Ok(ResolutionMethod::ExactRomanized),
            "user_selected" => Ok(ResolutionMethod::UserSelected),
            "not_found" => Ok(ResolutionMethod::NotFound),
            _ => Err(format!("Invalid resolution method: {}", s)),
        }
    }
}

/// A single anime to be loaded from the remote catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeLoadTask {
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

impl AnimeLoadTask {
    /// Check if the task has attempts left
    pub fn can_retry(&self) -> bool {
        self.attempt_count < self.max_attempts && self.status != TaskStatus::Completed
    }

    /// Check if the task is eligible for dispatch at `now`
    pub fn should_process(&self, now: DateTime<Utc>) -> bool {
        if self.status != TaskStatus::Pending {
            return false;
        }
        match self.next_retry_at {
            Some(retry_at) => retry_at <= now,
            None => true,
        }
    }
}

/// A task to be queued (before insertion to database)
#[derive(Debug, Clone)]
pub struct NewAnimeLoadTask {
    pub export_job_id: Option<Uuid>,
    pub user_id: Uuid,
    pub mal_id: i32,
    pub mal_title: String,
    pub mal_title_japanese: Option<String>,
    pub mal_title_english: Option<String>,
    pub priority: i32,
    pub max_attempts: i32,
}

pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

impl NewAnimeLoadTask {
    pub fn new(export_job_id: Option<Uuid>, user_id: Uuid, mal_id: i32, mal_title: String) -> Self {
        Self {
            export_job_id,
            user_id,
            mal_id,
            mal_title,
            mal_title_japanese: None,
            mal_title_english: None,
            priority: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Per-job task statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: i64,
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
    pub skipped: i64,
}

impl TaskStats {
    /// Tasks that still have work ahead of them
    pub fn unfinished(&self) -> i64 {
        self.pending + self.processing
    }
}
