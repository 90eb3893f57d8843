use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateDishParams, DishesRepo, DishesWriteRepo, RepoError, UpdateDishParams,
};
use crate::domain::entities::DishRecord;
use crate::domain::price::Price;

use super::{PostgresRepositories, map_sqlx_error};

const DISH_COLUMNS: &str = "id, submenu_id, title, description, price_minor, created_at, updated_at";

// Dish lookups join through submenus so an id is only reachable under its
// own menu/submenu chain.
const DISH_SCOPED_SELECT: &str = "SELECT d.id, d.submenu_id, d.title, d.description, \
            d.price_minor, d.created_at, d.updated_at \
       FROM dishes d \
      INNER JOIN submenus s ON s.id = d.submenu_id \
      WHERE s.menu_id = $1 AND d.submenu_id = $2 ";

#[derive(sqlx::FromRow)]
struct DishRow {
    id: Uuid,
    submenu_id: Uuid,
    title: String,
    description: String,
    price_minor: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<DishRow> for DishRecord {
    fn from(row: DishRow) -> Self {
        Self {
            id: row.id,
            submenu_id: row.submenu_id,
            title: row.title,
            description: row.description,
            price: Price::from_minor_units(row.price_minor),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl DishesRepo for PostgresRepositories {
    async fn list(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<Vec<DishRecord>, RepoError> {
        let rows = sqlx::query_as::<_, DishRow>(DISH_SCOPED_SELECT)
            .bind(menu_id)
            .bind(submenu_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(DishRecord::from).collect())
    }

    async fn find(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        id: Uuid,
    ) -> Result<Option<DishRecord>, RepoError> {
        let sql = format!("{DISH_SCOPED_SELECT} AND d.id = $3");
        let row = sqlx::query_as::<_, DishRow>(&sql)
            .bind(menu_id)
            .bind(submenu_id)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(DishRecord::from))
    }
}

#[async_trait]
impl DishesWriteRepo for PostgresRepositories {
    async fn create_dish(
        &self,
        submenu_id: Uuid,
        params: CreateDishParams,
    ) -> Result<DishRecord, RepoError> {
        let sql = format!(
            "INSERT INTO dishes (submenu_id, title, description, price_minor) \
             VALUES ($1, $2, $3, $4) RETURNING {DISH_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DishRow>(&sql)
            .bind(submenu_id)
            .bind(params.title)
            .bind(params.description)
            .bind(params.price.minor_units())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(DishRecord::from(row))
    }

    async fn update_dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        id: Uuid,
        params: UpdateDishParams,
    ) -> Result<Option<DishRecord>, RepoError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE dishes SET updated_at = now()");

        if let Some(title) = params.title {
            qb.push(", title = ");
            qb.push_bind(title);
        }
        if let Some(description) = params.description {
            qb.push(", description = ");
            qb.push_bind(description);
        }
        if let Some(price) = params.price {
            qb.push(", price_minor = ");
            qb.push_bind(price.minor_units());
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" AND submenu_id = ");
        qb.push_bind(submenu_id);
        qb.push(" AND EXISTS (SELECT 1 FROM submenus s WHERE s.id = dishes.submenu_id AND s.menu_id = ");
        qb.push_bind(menu_id);
        qb.push(") RETURNING ");
        qb.push(DISH_COLUMNS);

        let row = qb
            .build_query_as::<DishRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(DishRecord::from))
    }

    async fn delete_dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        id: Uuid,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "DELETE FROM dishes \
              WHERE id = $1 AND submenu_id = $2 \
                AND EXISTS (SELECT 1 FROM submenus s WHERE s.id = dishes.submenu_id AND s.menu_id = $3)",
        )
        .bind(id)
        .bind(submenu_id)
        .bind(menu_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
