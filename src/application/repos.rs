//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{DishRecord, JobRecord, MenuRecord, SubmenuRecord};
use crate::domain::price::Price;
use crate::domain::types::JobType;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateMenuParams {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMenuParams {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateSubmenuParams {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSubmenuParams {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateDishParams {
    pub title: String,
    pub description: String,
    pub price: Price,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDishParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
}

/// Menu row joined with its descendant counts.
///
/// `dishes_count` is transitive: every dish under every submenu of the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuWithCounts {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub submenus_count: i64,
    pub dishes_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmenuWithCounts {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
    pub dishes_count: i64,
}

#[async_trait]
pub trait MenusRepo: Send + Sync {
    async fn list_with_counts(&self) -> Result<Vec<MenuWithCounts>, RepoError>;
    async fn find(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError>;
    async fn find_with_counts(&self, id: Uuid) -> Result<Option<MenuWithCounts>, RepoError>;
}

#[async_trait]
pub trait MenusWriteRepo: Send + Sync {
    async fn create_menu(&self, params: CreateMenuParams) -> Result<MenuRecord, RepoError>;
    async fn update_menu(
        &self,
        id: Uuid,
        params: UpdateMenuParams,
    ) -> Result<Option<MenuRecord>, RepoError>;
    async fn delete_menu(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait SubmenusRepo: Send + Sync {
    async fn list_with_counts(&self, menu_id: Uuid) -> Result<Vec<SubmenuWithCounts>, RepoError>;
    async fn find(&self, menu_id: Uuid, id: Uuid) -> Result<Option<SubmenuRecord>, RepoError>;
    async fn find_with_counts(
        &self,
        menu_id: Uuid,
        id: Uuid,
    ) -> Result<Option<SubmenuWithCounts>, RepoError>;
}

#[async_trait]
pub trait SubmenusWriteRepo: Send + Sync {
    async fn create_submenu(
        &self,
        menu_id: Uuid,
        params: CreateSubmenuParams,
    ) -> Result<SubmenuRecord, RepoError>;
    async fn update_submenu(
        &self,
        menu_id: Uuid,
        id: Uuid,
        params: UpdateSubmenuParams,
    ) -> Result<Option<SubmenuRecord>, RepoError>;
    async fn delete_submenu(&self, menu_id: Uuid, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait DishesRepo: Send + Sync {
    async fn list(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<Vec<DishRecord>, RepoError>;
    async fn find(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        id: Uuid,
    ) -> Result<Option<DishRecord>, RepoError>;
}

#[async_trait]
pub trait DishesWriteRepo: Send + Sync {
    async fn create_dish(
        &self,
        submenu_id: Uuid,
        params: CreateDishParams,
    ) -> Result<DishRecord, RepoError>;
    async fn update_dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        id: Uuid,
        params: UpdateDishParams,
    ) -> Result<Option<DishRecord>, RepoError>;
    async fn delete_dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        id: Uuid,
    ) -> Result<bool, RepoError>;
}

/// One menu subtree in a full-hierarchy snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuExportNode {
    pub title: String,
    pub description: String,
    pub submenus: Vec<SubmenuExportNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmenuExportNode {
    pub title: String,
    pub description: String,
    pub dishes: Vec<DishExportNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishExportNode {
    pub title: String,
    pub description: String,
    pub price: Price,
}

#[async_trait]
pub trait HierarchyRepo: Send + Sync {
    /// Snapshot the entire menu → submenu → dish tree in storage order.
    async fn dump_hierarchy(&self) -> Result<Vec<MenuExportNode>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct NewJobRecord {
    pub job_type: JobType,
    pub payload: serde_json::Value,
    pub run_at: OffsetDateTime,
    pub max_attempts: i32,
}

#[async_trait]
pub trait JobsRepo: Send + Sync {
    async fn enqueue_job(&self, job: NewJobRecord) -> Result<String, RepoError>;
    async fn find_job(&self, id: &str) -> Result<Option<JobRecord>, RepoError>;
}
