use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{JobsRepo, NewJobRecord, RepoError};
use crate::domain::entities::JobRecord;
use crate::domain::types::{JobState, JobType};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct JobRow {
    id: String,
    job_type: String,
    job: serde_json::Value,
    status: String,
    attempts: i32,
    max_attempts: i32,
    run_at: OffsetDateTime,
    done_at: Option<OffsetDateTime>,
    last_error: Option<String>,
}

impl TryFrom<JobRow> for JobRecord {
    type Error = RepoError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let job_type = JobType::try_from(row.job_type.as_str()).map_err(|_| {
            RepoError::from_persistence(format!("unknown job type `{}`", row.job_type))
        })?;

        let state = JobState::try_from(row.status.as_str()).map_err(|_| {
            RepoError::from_persistence(format!("unknown job state `{}`", row.status))
        })?;

        Ok(Self {
            id: row.id,
            job_type,
            payload: row.job,
            state,
            attempts: row.attempts,
            max_attempts: row.max_attempts,
            run_at: row.run_at,
            done_at: row.done_at,
            last_error: row.last_error,
        })
    }
}

#[async_trait]
impl JobsRepo for PostgresRepositories {
    async fn enqueue_job(&self, job: NewJobRecord) -> Result<String, RepoError> {
        let id: String = sqlx::query_scalar(
            "SELECT (apalis.push_job($1, $2::json, $3, $4, $5, $6)).id",
        )
        .bind(job.job_type.as_str())
        .bind(job.payload)
        .bind("Pending")
        .bind(job.run_at)
        .bind(job.max_attempts)
        .bind(0_i32)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(id)
    }

    async fn find_job(&self, id: &str) -> Result<Option<JobRecord>, RepoError> {
        let row = sqlx::query_as::<_, JobRow>(
            "SELECT id, job_type, job, status, attempts, max_attempts, run_at, done_at, last_error \
               FROM apalis.jobs \
              WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => JobRecord::try_from(row).map(Some),
            None => Ok(None),
        }
    }
}
