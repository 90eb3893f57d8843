use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::repos::SubmenuWithCounts;
use crate::domain::entities::{DishRecord, MenuRecord, SubmenuRecord};
use crate::domain::price::Price;
use crate::domain::types::JobState;

#[derive(Debug, Deserialize, Serialize)]
pub struct MenuCreateRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MenuUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubmenuCreateRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SubmenuUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DishCreateRequest {
    pub title: String,
    pub description: String,
    pub price: Price,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DishUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
}

/// Create/update response for a menu; counts only appear on detail views.
#[derive(Debug, Serialize, Deserialize)]
pub struct MenuView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

impl From<MenuRecord> for MenuView {
    fn from(record: MenuRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmenuView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

impl From<SubmenuRecord> for SubmenuView {
    fn from(record: SubmenuRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmenuDetailView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub dishes_count: i64,
}

impl From<SubmenuWithCounts> for SubmenuDetailView {
    fn from(record: SubmenuWithCounts) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            dishes_count: record.dishes_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DishView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Price,
}

impl From<DishRecord> for DishView {
    fn from(record: DishRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            price: record.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeedResponse {
    pub seeded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportTaskCreatedResponse {
    pub task_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportTaskStatusResponse {
    pub task_id: String,
    pub task_status: JobState,
}
