//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::price::Price;
use crate::domain::types::{JobState, JobType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmenuRecord {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishRecord {
    pub id: Uuid,
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub id: String,
    pub job_type: JobType,
    pub payload: serde_json::Value,
    pub state: JobState,
    pub attempts: i32,
    pub max_attempts: i32,
    pub run_at: OffsetDateTime,
    pub done_at: Option<OffsetDateTime>,
    pub last_error: Option<String>,
}
