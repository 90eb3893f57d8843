//! Export orchestration: enqueue spreadsheet jobs and resolve their status.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::fs;

use crate::application::error::ServiceError;
use crate::application::jobs::{ExportHierarchyJobPayload, enqueue_export_job, export_file_path};
use crate::application::repos::{HierarchyRepo, JobsRepo, RepoError};
use crate::domain::entities::JobRecord;
use crate::domain::types::JobState;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolution of an export task lookup.
#[derive(Debug)]
pub enum ExportStatus {
    /// The job finished; the spreadsheet is at `file`.
    Ready { file: PathBuf },
    /// The job is still queued, running, or has failed.
    Pending { job: JobRecord },
}

#[derive(Clone)]
pub struct ExportService {
    jobs: Arc<dyn JobsRepo>,
    media_dir: PathBuf,
}

impl ExportService {
    pub fn new(jobs: Arc<dyn JobsRepo>, media_dir: PathBuf) -> Self {
        Self { jobs, media_dir }
    }

    /// Enqueue a hierarchy export, returning the task id for polling.
    pub async fn enqueue(&self) -> Result<String, ServiceError> {
        let task_id = enqueue_export_job(self.jobs.as_ref()).await?;
        Ok(task_id)
    }

    /// Look up an export task, resolving the output file once done.
    pub async fn status(&self, task_id: &str) -> Result<ExportStatus, ServiceError> {
        let job = self
            .jobs
            .find_job(task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("export task"))?;

        if job.state != JobState::Done {
            return Ok(ExportStatus::Pending { job });
        }

        let payload: ExportHierarchyJobPayload = serde_json::from_value(job.payload.clone())
            .map_err(|err| {
                ServiceError::Repo(RepoError::from_persistence(format!(
                    "export job `{task_id}` has an unreadable payload: {err}"
                )))
            })?;

        Ok(ExportStatus::Ready {
            file: export_file_path(&self.media_dir, payload.export_id),
        })
    }
}

/// Snapshot the hierarchy and write it to `path` as CSV.
///
/// Shared by the background worker and the `mensa export` subcommand.
pub async fn write_export_file(repo: &dyn HierarchyRepo, path: &Path) -> Result<(), ExportError> {
    let menus = repo.dump_hierarchy().await?;
    let csv = crate::application::jobs::render_csv(&menus);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, csv).await?;

    Ok(())
}
