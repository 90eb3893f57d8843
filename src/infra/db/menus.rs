use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateMenuParams, MenuWithCounts, MenusRepo, MenusWriteRepo, RepoError, UpdateMenuParams,
};
use crate::domain::entities::MenuRecord;

use super::{PostgresRepositories, map_sqlx_error};

const MENU_COLUMNS: &str = "id, title, description, created_at, updated_at";

// Transitive counts: submenus must be counted distinct because the dish
// join repeats each submenu row once per dish.
const MENU_COUNTS_SELECT: &str = "SELECT m.id, m.title, m.description, \
            COUNT(DISTINCT s.id) AS submenus_count, \
            COUNT(d.id) AS dishes_count \
       FROM menus m \
       LEFT JOIN submenus s ON s.menu_id = m.id \
       LEFT JOIN dishes d ON d.submenu_id = s.id ";

#[derive(sqlx::FromRow)]
struct MenuRow {
    id: Uuid,
    title: String,
    description: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<MenuRow> for MenuRecord {
    fn from(row: MenuRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MenuCountsRow {
    id: Uuid,
    title: String,
    description: String,
    submenus_count: i64,
    dishes_count: i64,
}

impl From<MenuCountsRow> for MenuWithCounts {
    fn from(row: MenuCountsRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            submenus_count: row.submenus_count,
            dishes_count: row.dishes_count,
        }
    }
}

#[async_trait]
impl MenusRepo for PostgresRepositories {
    async fn list_with_counts(&self) -> Result<Vec<MenuWithCounts>, RepoError> {
        let sql = format!("{MENU_COUNTS_SELECT} GROUP BY m.id");
        let rows = sqlx::query_as::<_, MenuCountsRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(MenuWithCounts::from).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError> {
        let sql = format!("SELECT {MENU_COLUMNS} FROM menus WHERE id = $1");
        let row = sqlx::query_as::<_, MenuRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(MenuRecord::from))
    }

    async fn find_with_counts(&self, id: Uuid) -> Result<Option<MenuWithCounts>, RepoError> {
        let sql = format!("{MENU_COUNTS_SELECT} WHERE m.id = $1 GROUP BY m.id");
        let row = sqlx::query_as::<_, MenuCountsRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(MenuWithCounts::from))
    }
}

#[async_trait]
impl MenusWriteRepo for PostgresRepositories {
    async fn create_menu(&self, params: CreateMenuParams) -> Result<MenuRecord, RepoError> {
        let sql = format!(
            "INSERT INTO menus (title, description) VALUES ($1, $2) RETURNING {MENU_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MenuRow>(&sql)
            .bind(params.title)
            .bind(params.description)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(MenuRecord::from(row))
    }

    async fn update_menu(
        &self,
        id: Uuid,
        params: UpdateMenuParams,
    ) -> Result<Option<MenuRecord>, RepoError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE menus SET updated_at = now()");

        if let Some(title) = params.title {
            qb.push(", title = ");
            qb.push_bind(title);
        }
        if let Some(description) = params.description {
            qb.push(", description = ");
            qb.push_bind(description);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING ");
        qb.push(MENU_COLUMNS);

        let row = qb
            .build_query_as::<MenuRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(MenuRecord::from))
    }

    async fn delete_menu(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
