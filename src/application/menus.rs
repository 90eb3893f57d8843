//! Menu service: orchestrates the menus repository and the response cache.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repos::{
    CreateMenuParams, MenuWithCounts, MenusRepo, MenusWriteRepo, UpdateMenuParams,
};
use crate::cache::{CacheKey, InvalidationPlan, ResponseCache};
use crate::domain::entities::MenuRecord;

#[derive(Debug, Clone)]
pub struct CreateMenuCommand {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMenuCommand {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct MenuService {
    reader: Arc<dyn MenusRepo>,
    writer: Arc<dyn MenusWriteRepo>,
    cache: Arc<ResponseCache>,
}

impl MenuService {
    pub fn new(
        reader: Arc<dyn MenusRepo>,
        writer: Arc<dyn MenusWriteRepo>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    pub async fn create(&self, command: CreateMenuCommand) -> Result<MenuRecord, ServiceError> {
        let menu = self
            .writer
            .create_menu(CreateMenuParams {
                title: command.title,
                description: command.description,
            })
            .await?;

        self.cache.apply(&InvalidationPlan::menu_written(None));
        Ok(menu)
    }

    pub async fn get_list(&self) -> Result<Vec<MenuWithCounts>, ServiceError> {
        if let Some(cached) = self.cache.get_json::<Vec<MenuWithCounts>>(&CacheKey::MenuList) {
            return Ok(cached);
        }

        let menus = self.reader.list_with_counts().await?;
        self.cache.put_json(CacheKey::MenuList, &menus);
        Ok(menus)
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<MenuWithCounts, ServiceError> {
        let key = CacheKey::Menu(id);
        if let Some(cached) = self.cache.get_json::<MenuWithCounts>(&key) {
            return Ok(cached);
        }

        let menu = self
            .reader
            .find_with_counts(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("menu"))?;

        self.cache.put_json(key, &menu);
        Ok(menu)
    }

    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateMenuCommand,
    ) -> Result<MenuRecord, ServiceError> {
        let menu = self
            .writer
            .update_menu(
                id,
                UpdateMenuParams {
                    title: command.title,
                    description: command.description,
                },
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("menu"))?;

        self.cache.apply(&InvalidationPlan::menu_written(Some(id)));
        Ok(menu)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let deleted = self.writer.delete_menu(id).await?;
        if !deleted {
            return Err(ServiceError::not_found("menu"));
        }

        self.cache.apply(&InvalidationPlan::menu_written(Some(id)));
        Ok(true)
    }
}
