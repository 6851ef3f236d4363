/// Diesel models for the mal_export_jobs table
use crate::modules::export::domain::entities::{ExportJob, ExportJobStatus, NewExportJob};
use crate::schema::mal_export_jobs;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

#[derive(Insertable, Debug)]
#[diesel(table_name = mal_export_jobs)]
pub struct NewExportJobModel {
    pub user_id: Uuid,
    pub mal_username: String,
    pub status: ExportJobStatus,
}

impl From<NewExportJob> for NewExportJobModel {
    fn from(job: NewExportJob) -> Self {
        Self {
            user_id: job.user_id,
            mal_username: job.mal_username,
            status: ExportJobStatus::Pending,
        }
    }
}

#[derive(Queryable, Selectable, QueryableByName, Debug, Clone)]
#[diesel(table_name = mal_export_jobs)]
pub struct ExportJobModel {
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

impl ExportJobModel {
    pub fn into_domain(self) -> ExportJob {
        ExportJob {
            id: self.id,
            user_id: self.user_id,
            mal_username: self.mal_username,
            status: self.status,
            total_anime: self.total_anime,
            processed_anime: self.processed_anime,
            loaded_anime: self.loaded_anime,
            skipped_anime: self.skipped_anime,
            failed_anime: self.failed_anime,
            error_message: self.error_message,
            started_at: self.started_at,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
