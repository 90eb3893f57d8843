//! Submenu service.
//!
//! Submenus live under a menu; every mutation first verifies the owning
//! menu through the shared ancestry guard.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::ancestry::ensure_menu;
use crate::application::error::ServiceError;
use crate::application::repos::{
    CreateSubmenuParams, MenusRepo, SubmenuWithCounts, SubmenusRepo, SubmenusWriteRepo,
    UpdateSubmenuParams,
};
use crate::cache::{CacheKey, InvalidationPlan, ResponseCache};
use crate::domain::entities::SubmenuRecord;

#[derive(Debug, Clone)]
pub struct CreateSubmenuCommand {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSubmenuCommand {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct SubmenuService {
    reader: Arc<dyn SubmenusRepo>,
    writer: Arc<dyn SubmenusWriteRepo>,
    menus: Arc<dyn MenusRepo>,
    cache: Arc<ResponseCache>,
}

impl SubmenuService {
    pub fn new(
        reader: Arc<dyn SubmenusRepo>,
        writer: Arc<dyn SubmenusWriteRepo>,
        menus: Arc<dyn MenusRepo>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            reader,
            writer,
            menus,
            cache,
        }
    }

    pub async fn create(
        &self,
        menu_id: Uuid,
        command: CreateSubmenuCommand,
    ) -> Result<SubmenuRecord, ServiceError> {
        ensure_menu(self.menus.as_ref(), menu_id).await?;

        let submenu = self
            .writer
            .create_submenu(
                menu_id,
                CreateSubmenuParams {
                    title: command.title,
                    description: command.description,
                },
            )
            .await?;

        self.cache
            .apply(&InvalidationPlan::submenu_written(menu_id, None));
        Ok(submenu)
    }

    pub async fn get_list(&self, menu_id: Uuid) -> Result<Vec<SubmenuWithCounts>, ServiceError> {
        ensure_menu(self.menus.as_ref(), menu_id).await?;

        let key = CacheKey::SubmenuList { menu_id };
        if let Some(cached) = self.cache.get_json::<Vec<SubmenuWithCounts>>(&key) {
            return Ok(cached);
        }

        let submenus = self.reader.list_with_counts(menu_id).await?;
        self.cache.put_json(key, &submenus);
        Ok(submenus)
    }

    pub async fn get_detail(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<SubmenuWithCounts, ServiceError> {
        let key = CacheKey::Submenu(submenu_id);
        if let Some(cached) = self.cache.get_json::<SubmenuWithCounts>(&key) {
            return Ok(cached);
        }

        let submenu = self
            .reader
            .find_with_counts(menu_id, submenu_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("submenu"))?;

        self.cache.put_json(key, &submenu);
        Ok(submenu)
    }

    pub async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        command: UpdateSubmenuCommand,
    ) -> Result<SubmenuRecord, ServiceError> {
        let submenu = self
            .writer
            .update_submenu(
                menu_id,
                submenu_id,
                UpdateSubmenuParams {
                    title: command.title,
                    description: command.description,
                },
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("submenu"))?;

        self.cache
            .apply(&InvalidationPlan::submenu_written(menu_id, Some(submenu_id)));
        Ok(submenu)
    }

    pub async fn delete(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<bool, ServiceError> {
        let deleted = self.writer.delete_submenu(menu_id, submenu_id).await?;
        if !deleted {
            return Err(ServiceError::not_found("submenu"));
        }

        self.cache
            .apply(&InvalidationPlan::submenu_written(menu_id, Some(submenu_id)));
        Ok(true)
    }
}
