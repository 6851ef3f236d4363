/// Domain entities for MAL export jobs
///
/// An export job is the parent aggregate for one user's watch-list import.
/// Its counters are a cached projection of the child task states; the task
/// table stays the source of truth.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Export job status enum matching the `export_status` database type
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::ExportStatus"]
#[serde(rename_all = "lowercase")]
pub enum ExportJobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl ExportJobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportJobStatus::Completed | ExportJobStatus::Failed | ExportJobStatus::Cancelled
        )
    }
}

impl std::fmt::Display for ExportJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportJobStatus::Pending => write!(f, "pending"),
            ExportJobStatus::Processing => write!(f, "processing"),
            ExportJobStatus::Completed => write!(f, "completed"),
            ExportJobStatus::Failed => write!(f, "failed"),
            ExportJobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ExportJobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ExportJobStatus::Pending),
            "processing" => Ok(ExportJobStatus::Processing),
            "completed" => Ok(ExportJobStatus::Completed),
            "failed" => Ok(ExportJobStatus::Failed),
            "cancelled" => Ok(ExportJobStatus::Cancelled),
            _ => Err(format!("Invalid export job status: {}", s)),
        }
    }
}

/// Tracks the overall progress of a MAL export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJob {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mal_username: String,
    pub status: ExportJobStatus,
    pub total_anime: i32,
    pub processed_anime: i32,
    pub loaded_anime: i32,
    pub skipped_anime: i32,
    pub failed_anime: i32,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExportJob {
    /// True while the export is still running
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            ExportJobStatus::Pending | ExportJobStatus::Processing
        )
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_anime == 0 {
            return 0.0;
        }
        f64::from(self.processed_anime) / f64::from(self.total_anime) * 100.0
    }

    pub fn to_response(&self) -> ExportJobResponse {
        ExportJobResponse {
            id: self.id,
            mal_username: self.mal_username.clone(),
            status: self.status,
            total_anime: self.total_anime,
            processed_anime: self.processed_anime,
            loaded_anime: self.loaded_anime,
            skipped_anime: self.skipped_anime,
            failed_anime: self.failed_anime,
            progress_percent: self.progress_percent(),
            error_message: self.error_message.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at,
            created_at: self.created_at,
        }
    }
}

/// A job to be created (before insertion to database)
#[derive(Debug, Clone)]
pub struct NewExportJob {
    pub user_id: Uuid,
    pub mal_username: String,
}

/// Request to create a new export job
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExportJobRequest {
    pub user_id: Uuid,
    pub mal_username: String,
}

/// One anime entry handed to the coordinator
#[derive(Debug, Clone, Deserialize)]
pub struct AnimeTaskInput {
    pub mal_id: i32,
    pub title: String,
    #[serde(default)]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub title_english: Option<String>,
}

/// Request to create anime load tasks for an export job
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTasksRequest {
    pub export_job_id: Uuid,
    pub user_id: Uuid,
    pub tasks: Vec<AnimeTaskInput>,
    #[serde(default)]
    pub priority: i32,
}

/// Polling-surface projection of an export job
#[derive(Debug, Clone, Serialize)]
pub struct ExportJobResponse {
    pub id: Uuid,
    pub mal_username: String,
    pub status: ExportJobStatus,
    pub total_anime: i32,
    pub processed_anime: i32,
    pub loaded_anime: i32,
    pub skipped_anime: i32,
    pub failed_anime: i32,
    pub progress_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
