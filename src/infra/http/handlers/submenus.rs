//! Submenu handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::submenus::{CreateSubmenuCommand, UpdateSubmenuCommand};

use super::service_error_to_api;
use crate::infra::http::ApiState;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{
    DeleteResponse, SubmenuCreateRequest, SubmenuDetailView, SubmenuUpdateRequest, SubmenuView,
};

pub async fn create_submenu(
    State(state): State<ApiState>,
    Path(menu_id): Path<Uuid>,
    Json(payload): Json<SubmenuCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let submenu = state
        .submenus
        .create(
            menu_id,
            CreateSubmenuCommand {
                title: payload.title,
                description: payload.description,
            },
        )
        .await
        .map_err(service_error_to_api)?;

    Ok((StatusCode::CREATED, Json(SubmenuView::from(submenu))))
}

pub async fn list_submenus(
    State(state): State<ApiState>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let submenus = state
        .submenus
        .get_list(menu_id)
        .await
        .map_err(service_error_to_api)?;

    let views: Vec<SubmenuDetailView> = submenus
        .into_iter()
        .map(SubmenuDetailView::from)
        .collect();
    Ok(Json(views))
}

pub async fn get_submenu(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let submenu = state
        .submenus
        .get_detail(menu_id, submenu_id)
        .await
        .map_err(service_error_to_api)?;

    Ok(Json(SubmenuDetailView::from(submenu)))
}

pub async fn update_submenu(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SubmenuUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let submenu = state
        .submenus
        .update(
            menu_id,
            submenu_id,
            UpdateSubmenuCommand {
                title: payload.title,
                description: payload.description,
            },
        )
        .await
        .map_err(service_error_to_api)?;

    Ok(Json(SubmenuView::from(submenu)))
}

pub async fn delete_submenu(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .submenus
        .delete(menu_id, submenu_id)
        .await
        .map_err(service_error_to_api)?;

    Ok(Json(DeleteResponse { deleted }))
}
