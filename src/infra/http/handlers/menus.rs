//! Menu handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::menus::{CreateMenuCommand, UpdateMenuCommand};

use super::service_error_to_api;
use crate::infra::http::ApiState;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{DeleteResponse, MenuCreateRequest, MenuUpdateRequest, MenuView};

pub async fn create_menu(
    State(state): State<ApiState>,
    Json(payload): Json<MenuCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let menu = state
        .menus
        .create(CreateMenuCommand {
            title: payload.title,
            description: payload.description,
        })
        .await
        .map_err(service_error_to_api)?;

    Ok((StatusCode::CREATED, Json(MenuView::from(menu))))
}

pub async fn list_menus(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let menus = state.menus.get_list().await.map_err(service_error_to_api)?;
    Ok(Json(menus))
}

pub async fn get_menu(
    State(state): State<ApiState>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let menu = state
        .menus
        .get_detail(menu_id)
        .await
        .map_err(service_error_to_api)?;
    Ok(Json(menu))
}

pub async fn update_menu(
    State(state): State<ApiState>,
    Path(menu_id): Path<Uuid>,
    Json(payload): Json<MenuUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let menu = state
        .menus
        .update(
            menu_id,
            UpdateMenuCommand {
                title: payload.title,
                description: payload.description,
            },
        )
        .await
        .map_err(service_error_to_api)?;

    Ok(Json(MenuView::from(menu)))
}

pub async fn delete_menu(
    State(state): State<ApiState>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .menus
        .delete(menu_id)
        .await
        .map_err(service_error_to_api)?;

    Ok(Json(DeleteResponse { deleted }))
}
