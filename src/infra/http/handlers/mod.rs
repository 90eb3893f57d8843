//! API handlers organized by resource type.
//!
//! Error conversion from service failures to wire errors lives here and is
//! shared across modules.

mod data;
mod dishes;
mod menus;
mod submenus;

pub use data::*;
pub use dishes::*;
pub use menus::*;
pub use submenus::*;

use axum::http::StatusCode;

use crate::application::error::ServiceError;
use crate::application::repos::RepoError;

use super::error::{ApiError, codes};

fn repo_error_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "duplicate record",
            Some(constraint),
        ),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "persistence error",
            Some(message),
        ),
    }
}

pub(super) fn service_error_to_api(err: ServiceError) -> ApiError {
    match err {
        ServiceError::NotFound { entity } => ApiError::not_found(match entity {
            "menu" => "menu not found",
            "submenu" => "submenu not found",
            "dish" => "dish not found",
            "export task" => "export task not found",
            _ => "resource not found",
        }),
        ServiceError::Repo(err) => repo_error_to_api(err),
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn not_found_maps_to_404_for_every_entity_kind() {
        for entity in ["menu", "submenu", "dish", "export task"] {
            let response =
                service_error_to_api(ServiceError::not_found(entity)).into_response();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn repo_failures_map_to_server_side_statuses() {
        let response = service_error_to_api(ServiceError::Repo(RepoError::Timeout)).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = service_error_to_api(ServiceError::Repo(RepoError::Persistence(
            "pool closed".to_string(),
        )))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
