use time::OffsetDateTime;

use crate::application::repos::{JobsRepo, NewJobRecord, RepoError};
use crate::domain::types::JobType;

/// Enqueue a job with the provided payload, returning the assigned id.
pub async fn enqueue_job<J, P>(
    repo: &J,
    job_type: JobType,
    payload: &P,
    run_at: Option<OffsetDateTime>,
    max_attempts: i32,
) -> Result<String, RepoError>
where
    J: JobsRepo + ?Sized,
    P: serde::Serialize,
{
    let payload = serde_json::to_value(payload)
        .map_err(|err| RepoError::from_persistence(err.to_string()))?;
    let record = NewJobRecord {
        job_type,
        payload,
        run_at: run_at.unwrap_or_else(OffsetDateTime::now_utc),
        max_attempts,
    };

    repo.enqueue_job(record).await
}
