pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::application::dishes::DishService;
use crate::application::error::ErrorReport;
use crate::application::export::ExportService;
use crate::application::menus::MenuService;
use crate::application::seed::SeedService;
use crate::application::submenus::SubmenuService;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct ApiState {
    pub menus: Arc<MenuService>,
    pub submenus: Arc<SubmenuService>,
    pub dishes: Arc<DishService>,
    pub seed: Arc<SeedService>,
    pub export: Arc<ExportService>,
    pub db: Arc<PostgresRepositories>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(db_health))
        .route(
            "/api/v1/menus",
            get(handlers::list_menus).post(handlers::create_menu),
        )
        .route(
            "/api/v1/menus/{menu_id}",
            get(handlers::get_menu)
                .patch(handlers::update_menu)
                .delete(handlers::delete_menu),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus",
            get(handlers::list_submenus).post(handlers::create_submenu),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}",
            get(handlers::get_submenu)
                .patch(handlers::update_submenu)
                .delete(handlers::delete_submenu),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes",
            get(handlers::list_dishes).post(handlers::create_dish),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}",
            get(handlers::get_dish)
                .patch(handlers::update_dish)
                .delete(handlers::delete_dish),
        )
        .route("/api/v1/data", post(handlers::seed_demo_data))
        .route("/api/v1/data/tasks", post(handlers::create_export_task))
        .route(
            "/api/v1/data/tasks/{task_id}",
            get(handlers::get_export_task),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

async fn db_health(State(state): State<ApiState>) -> Response {
    match state.db.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error("infra::http::db_health", StatusCode::SERVICE_UNAVAILABLE, &err)
                .attach(&mut response);
            response
        }
    }
}
