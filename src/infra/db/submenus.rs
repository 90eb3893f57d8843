use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateSubmenuParams, RepoError, SubmenuWithCounts, SubmenusRepo, SubmenusWriteRepo,
    UpdateSubmenuParams,
};
use crate::domain::entities::SubmenuRecord;

use super::{PostgresRepositories, map_sqlx_error};

const SUBMENU_COLUMNS: &str = "id, menu_id, title, description, created_at, updated_at";

const SUBMENU_COUNTS_SELECT: &str = "SELECT s.id, s.menu_id, s.title, s.description, \
            COUNT(d.id) AS dishes_count \
       FROM submenus s \
       LEFT JOIN dishes d ON d.submenu_id = s.id ";

#[derive(sqlx::FromRow)]
struct SubmenuRow {
    id: Uuid,
    menu_id: Uuid,
    title: String,
    description: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<SubmenuRow> for SubmenuRecord {
    fn from(row: SubmenuRow) -> Self {
        Self {
            id: row.id,
            menu_id: row.menu_id,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubmenuCountsRow {
    id: Uuid,
    menu_id: Uuid,
    title: String,
    description: String,
    dishes_count: i64,
}

impl From<SubmenuCountsRow> for SubmenuWithCounts {
    fn from(row: SubmenuCountsRow) -> Self {
        Self {
            id: row.id,
            menu_id: row.menu_id,
            title: row.title,
            description: row.description,
            dishes_count: row.dishes_count,
        }
    }
}

#[async_trait]
impl SubmenusRepo for PostgresRepositories {
    async fn list_with_counts(&self, menu_id: Uuid) -> Result<Vec<SubmenuWithCounts>, RepoError> {
        let sql = format!("{SUBMENU_COUNTS_SELECT} WHERE s.menu_id = $1 GROUP BY s.id");
        let rows = sqlx::query_as::<_, SubmenuCountsRow>(&sql)
            .bind(menu_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SubmenuWithCounts::from).collect())
    }

    async fn find(&self, menu_id: Uuid, id: Uuid) -> Result<Option<SubmenuRecord>, RepoError> {
        let sql =
            format!("SELECT {SUBMENU_COLUMNS} FROM submenus WHERE menu_id = $1 AND id = $2");
        let row = sqlx::query_as::<_, SubmenuRow>(&sql)
            .bind(menu_id)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(SubmenuRecord::from))
    }

    async fn find_with_counts(
        &self,
        menu_id: Uuid,
        id: Uuid,
    ) -> Result<Option<SubmenuWithCounts>, RepoError> {
        let sql =
            format!("{SUBMENU_COUNTS_SELECT} WHERE s.menu_id = $1 AND s.id = $2 GROUP BY s.id");
        let row = sqlx::query_as::<_, SubmenuCountsRow>(&sql)
            .bind(menu_id)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(SubmenuWithCounts::from))
    }
}

#[async_trait]
impl SubmenusWriteRepo for PostgresRepositories {
    async fn create_submenu(
        &self,
        menu_id: Uuid,
        params: CreateSubmenuParams,
    ) -> Result<SubmenuRecord, RepoError> {
        let sql = format!(
            "INSERT INTO submenus (menu_id, title, description) VALUES ($1, $2, $3) \
             RETURNING {SUBMENU_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SubmenuRow>(&sql)
            .bind(menu_id)
            .bind(params.title)
            .bind(params.description)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(SubmenuRecord::from(row))
    }

    async fn update_submenu(
        &self,
        menu_id: Uuid,
        id: Uuid,
        params: UpdateSubmenuParams,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE submenus SET updated_at = now()");

        if let Some(title) = params.title {
            qb.push(", title = ");
            qb.push_bind(title);
        }
        if let Some(description) = params.description {
            qb.push(", description = ");
            qb.push_bind(description);
        }

        qb.push(" WHERE menu_id = ");
        qb.push_bind(menu_id);
        qb.push(" AND id = ");
        qb.push_bind(id);
        qb.push(" RETURNING ");
        qb.push(SUBMENU_COLUMNS);

        let row = qb
            .build_query_as::<SubmenuRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(SubmenuRecord::from))
    }

    async fn delete_submenu(&self, menu_id: Uuid, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM submenus WHERE menu_id = $1 AND id = $2")
            .bind(menu_id)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
