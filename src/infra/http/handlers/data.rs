//! Seeding and export handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tokio::fs;

use crate::application::export::ExportStatus;

use super::service_error_to_api;
use crate::infra::http::ApiState;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{
    ExportTaskCreatedResponse, ExportTaskStatusResponse, SeedResponse,
};

pub async fn seed_demo_data(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .seed
        .seed_demo_data()
        .await
        .map_err(service_error_to_api)?;

    Ok(Json(SeedResponse { seeded: true }))
}

pub async fn create_export_task(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = state.export.enqueue().await.map_err(service_error_to_api)?;

    Ok((
        StatusCode::CREATED,
        Json(ExportTaskCreatedResponse { task_id }),
    ))
}

pub async fn get_export_task(
    State(state): State<ApiState>,
    Path(task_id): Path<String>,
) -> Result<Response, ApiError> {
    match state
        .export
        .status(&task_id)
        .await
        .map_err(service_error_to_api)?
    {
        ExportStatus::Ready { file } => {
            let bytes = fs::read(&file).await.map_err(|err| {
                ApiError::export_failed(format!("{}: {err}", file.display()))
            })?;

            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("{task_id}.csv"));

            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                bytes,
            )
                .into_response())
        }
        ExportStatus::Pending { job } => Ok(Json(ExportTaskStatusResponse {
            task_id,
            task_status: job.state,
        })
        .into_response()),
    }
}
