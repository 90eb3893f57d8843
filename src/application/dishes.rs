//! Dish service.
//!
//! Dishes live two levels deep; lookups are scoped by the full
//! menu/submenu chain so a dish id is only reachable through its own
//! ancestors. Listing dishes of an unknown submenu deliberately yields an
//! empty collection rather than a 404.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::ancestry::ensure_submenu;
use crate::application::error::ServiceError;
use crate::application::repos::{
    CreateDishParams, DishesRepo, DishesWriteRepo, SubmenusRepo, UpdateDishParams,
};
use crate::cache::{CacheKey, InvalidationPlan, ResponseCache};
use crate::domain::entities::DishRecord;
use crate::domain::price::Price;

#[derive(Debug, Clone)]
pub struct CreateDishCommand {
    pub title: String,
    pub description: String,
    pub price: Price,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDishCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
}

#[derive(Clone)]
pub struct DishService {
    reader: Arc<dyn DishesRepo>,
    writer: Arc<dyn DishesWriteRepo>,
    submenus: Arc<dyn SubmenusRepo>,
    cache: Arc<ResponseCache>,
}

impl DishService {
    pub fn new(
        reader: Arc<dyn DishesRepo>,
        writer: Arc<dyn DishesWriteRepo>,
        submenus: Arc<dyn SubmenusRepo>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            reader,
            writer,
            submenus,
            cache,
        }
    }

    pub async fn create(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        command: CreateDishCommand,
    ) -> Result<DishRecord, ServiceError> {
        ensure_submenu(self.submenus.as_ref(), menu_id, submenu_id).await?;

        let dish = self
            .writer
            .create_dish(
                submenu_id,
                CreateDishParams {
                    title: command.title,
                    description: command.description,
                    price: command.price,
                },
            )
            .await?;

        self.cache
            .apply(&InvalidationPlan::dish_written(menu_id, submenu_id, None));
        Ok(dish)
    }

    pub async fn get_list(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Vec<DishRecord>, ServiceError> {
        let key = CacheKey::DishList {
            menu_id,
            submenu_id,
        };
        if let Some(cached) = self.cache.get_json::<Vec<DishRecord>>(&key) {
            return Ok(cached);
        }

        let dishes = self.reader.list(menu_id, submenu_id).await?;
        self.cache.put_json(key, &dishes);
        Ok(dishes)
    }

    pub async fn get_detail(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<DishRecord, ServiceError> {
        let key = CacheKey::Dish(dish_id);
        if let Some(cached) = self.cache.get_json::<DishRecord>(&key) {
            return Ok(cached);
        }

        let dish = self
            .reader
            .find(menu_id, submenu_id, dish_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("dish"))?;

        self.cache.put_json(key, &dish);
        Ok(dish)
    }

    pub async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
        command: UpdateDishCommand,
    ) -> Result<DishRecord, ServiceError> {
        let dish = self
            .writer
            .update_dish(
                menu_id,
                submenu_id,
                dish_id,
                UpdateDishParams {
                    title: command.title,
                    description: command.description,
                    price: command.price,
                },
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("dish"))?;

        self.cache.apply(&InvalidationPlan::dish_written(
            menu_id,
            submenu_id,
            Some(dish_id),
        ));
        Ok(dish)
    }

    pub async fn delete(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<bool, ServiceError> {
        let deleted = self.writer.delete_dish(menu_id, submenu_id, dish_id).await?;
        if !deleted {
            return Err(ServiceError::not_found("dish"));
        }

        self.cache.apply(&InvalidationPlan::dish_written(
            menu_id,
            submenu_id,
            Some(dish_id),
        ));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use crate::application::repos::{
        CreateDishParams, RepoError, SubmenuWithCounts, UpdateDishParams,
    };
    use crate::cache::CacheConfig;
    use crate::domain::entities::SubmenuRecord;

    use super::*;

    fn sample_dish(submenu_id: Uuid) -> DishRecord {
        DishRecord {
            id: Uuid::new_v4(),
            submenu_id,
            title: "Borscht".to_string(),
            description: "Beetroot".to_string(),
            price: Price::from_minor_units(25150),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    struct StubSubmenus {
        submenu: Option<SubmenuRecord>,
    }

    #[async_trait]
    impl SubmenusRepo for StubSubmenus {
        async fn list_with_counts(
            &self,
            _menu_id: Uuid,
        ) -> Result<Vec<SubmenuWithCounts>, RepoError> {
            Ok(Vec::new())
        }

        async fn find(
            &self,
            menu_id: Uuid,
            id: Uuid,
        ) -> Result<Option<SubmenuRecord>, RepoError> {
            Ok(self
                .submenu
                .clone()
                .filter(|submenu| submenu.menu_id == menu_id && submenu.id == id))
        }

        async fn find_with_counts(
            &self,
            _menu_id: Uuid,
            _id: Uuid,
        ) -> Result<Option<SubmenuWithCounts>, RepoError> {
            Ok(None)
        }
    }

    struct StubDishes {
        dish: DishRecord,
        list_calls: AtomicUsize,
    }

    #[async_trait]
    impl DishesRepo for StubDishes {
        async fn list(
            &self,
            _menu_id: Uuid,
            _submenu_id: Uuid,
        ) -> Result<Vec<DishRecord>, RepoError> {
            self.list_calls.fetch_add(1, Ordering::Relaxed);
            Ok(vec![self.dish.clone()])
        }

        async fn find(
            &self,
            _menu_id: Uuid,
            _submenu_id: Uuid,
            id: Uuid,
        ) -> Result<Option<DishRecord>, RepoError> {
            Ok((id == self.dish.id).then(|| self.dish.clone()))
        }
    }

    struct StubDishWriter {
        dish: DishRecord,
    }

    #[async_trait]
    impl DishesWriteRepo for StubDishWriter {
        async fn create_dish(
            &self,
            _submenu_id: Uuid,
            _params: CreateDishParams,
        ) -> Result<DishRecord, RepoError> {
            Ok(self.dish.clone())
        }

        async fn update_dish(
            &self,
            _menu_id: Uuid,
            _submenu_id: Uuid,
            _id: Uuid,
            _params: UpdateDishParams,
        ) -> Result<Option<DishRecord>, RepoError> {
            Ok(Some(self.dish.clone()))
        }

        async fn delete_dish(
            &self,
            _menu_id: Uuid,
            _submenu_id: Uuid,
            _id: Uuid,
        ) -> Result<bool, RepoError> {
            Ok(true)
        }
    }

    fn build_service(
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> (DishService, Arc<StubDishes>, Arc<ResponseCache>) {
        let submenu = SubmenuRecord {
            id: submenu_id,
            menu_id,
            title: "Soups".to_string(),
            description: "Hot".to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let dish = sample_dish(submenu_id);
        let reader = Arc::new(StubDishes {
            dish: dish.clone(),
            list_calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(ResponseCache::new(CacheConfig::default()));
        let service = DishService::new(
            reader.clone(),
            Arc::new(StubDishWriter { dish }),
            Arc::new(StubSubmenus {
                submenu: Some(submenu),
            }),
            cache.clone(),
        );
        (service, reader, cache)
    }

    #[tokio::test]
    async fn list_is_served_from_cache_after_the_first_read() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let (service, reader, _cache) = build_service(menu_id, submenu_id);

        let first = service.get_list(menu_id, submenu_id).await.expect("list");
        let second = service.get_list(menu_id, submenu_id).await.expect("list");

        assert_eq!(first, second);
        assert_eq!(reader.list_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn dish_write_invalidates_every_affected_key() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let (service, _reader, cache) = build_service(menu_id, submenu_id);

        let dish_id = service
            .get_list(menu_id, submenu_id)
            .await
            .expect("list")[0]
            .id;
        cache.put_json(CacheKey::MenuList, &vec![1]);
        cache.put_json(CacheKey::Menu(menu_id), &1);
        cache.put_json(CacheKey::SubmenuList { menu_id }, &vec![1]);
        cache.put_json(CacheKey::Submenu(submenu_id), &1);
        cache.put_json(CacheKey::Dish(dish_id), &1);

        service
            .update(menu_id, submenu_id, dish_id, UpdateDishCommand::default())
            .await
            .expect("update");

        assert_eq!(cache.get_json::<Vec<i32>>(&CacheKey::MenuList), None);
        assert_eq!(cache.get_json::<i32>(&CacheKey::Menu(menu_id)), None);
        assert_eq!(
            cache.get_json::<Vec<i32>>(&CacheKey::SubmenuList { menu_id }),
            None
        );
        assert_eq!(cache.get_json::<i32>(&CacheKey::Submenu(submenu_id)), None);
        assert_eq!(cache.get_json::<i32>(&CacheKey::Dish(dish_id)), None);
        assert_eq!(
            cache.get_json::<Vec<DishRecord>>(&CacheKey::DishList {
                menu_id,
                submenu_id
            }),
            None
        );
    }

    #[tokio::test]
    async fn create_under_a_missing_submenu_is_not_found() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let (service, _reader, _cache) = build_service(menu_id, submenu_id);

        let result = service
            .create(
                menu_id,
                Uuid::new_v4(),
                CreateDishCommand {
                    title: "Orphan".to_string(),
                    description: "no parent".to_string(),
                    price: Price::ZERO,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::NotFound { entity: "submenu" })
        ));
    }

    #[tokio::test]
    async fn detail_is_cached_until_invalidated() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let (service, reader, cache) = build_service(menu_id, submenu_id);
        let dish_id = reader.dish.id;

        let detail = service
            .get_detail(menu_id, submenu_id, dish_id)
            .await
            .expect("detail");
        assert_eq!(detail.price, Price::from_minor_units(25150));
        assert!(
            cache
                .get_json::<DishRecord>(&CacheKey::Dish(dish_id))
                .is_some()
        );

        service
            .delete(menu_id, submenu_id, dish_id)
            .await
            .expect("delete");
        assert!(
            cache
                .get_json::<DishRecord>(&CacheKey::Dish(dish_id))
                .is_none()
        );
    }
}
