//! Dish handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::dishes::{CreateDishCommand, UpdateDishCommand};

use super::service_error_to_api;
use crate::infra::http::ApiState;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{
    DeleteResponse, DishCreateRequest, DishUpdateRequest, DishView,
};

pub async fn create_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<DishCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dish = state
        .dishes
        .create(
            menu_id,
            submenu_id,
            CreateDishCommand {
                title: payload.title,
                description: payload.description,
                price: payload.price,
            },
        )
        .await
        .map_err(service_error_to_api)?;

    Ok((StatusCode::CREATED, Json(DishView::from(dish))))
}

pub async fn list_dishes(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let dishes = state
        .dishes
        .get_list(menu_id, submenu_id)
        .await
        .map_err(service_error_to_api)?;

    let views: Vec<DishView> = dishes.into_iter().map(DishView::from).collect();
    Ok(Json(views))
}

pub async fn get_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let dish = state
        .dishes
        .get_detail(menu_id, submenu_id, dish_id)
        .await
        .map_err(service_error_to_api)?;

    Ok(Json(DishView::from(dish)))
}

pub async fn update_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<DishUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dish = state
        .dishes
        .update(
            menu_id,
            submenu_id,
            dish_id,
            UpdateDishCommand {
                title: payload.title,
                description: payload.description,
                price: payload.price,
            },
        )
        .await
        .map_err(service_error_to_api)?;

    Ok(Json(DishView::from(dish)))
}

pub async fn delete_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .dishes
        .delete(menu_id, submenu_id, dish_id)
        .await
        .map_err(service_error_to_api)?;

    Ok(Json(DeleteResponse { deleted }))
}
