//! Parent-existence guards.
//!
//! Every child mutation runs through one of these checks instead of
//! scattering ad hoc lookups across services.

use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repos::{MenusRepo, SubmenusRepo};

pub async fn ensure_menu(repo: &dyn MenusRepo, menu_id: Uuid) -> Result<(), ServiceError> {
    match repo.find(menu_id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::not_found("menu")),
    }
}

pub async fn ensure_submenu(
    repo: &dyn SubmenusRepo,
    menu_id: Uuid,
    submenu_id: Uuid,
) -> Result<(), ServiceError> {
    match repo.find(menu_id, submenu_id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::not_found("submenu")),
    }
}
