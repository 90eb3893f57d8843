use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{
    DishExportNode, HierarchyRepo, MenuExportNode, RepoError, SubmenuExportNode,
};
use crate::domain::price::Price;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct MenuDumpRow {
    id: Uuid,
    title: String,
    description: String,
}

#[derive(sqlx::FromRow)]
struct SubmenuDumpRow {
    id: Uuid,
    menu_id: Uuid,
    title: String,
    description: String,
}

#[derive(sqlx::FromRow)]
struct DishDumpRow {
    submenu_id: Uuid,
    title: String,
    description: String,
    price_minor: i64,
}

#[async_trait]
impl HierarchyRepo for PostgresRepositories {
    async fn dump_hierarchy(&self) -> Result<Vec<MenuExportNode>, RepoError> {
        let menus = sqlx::query_as::<_, MenuDumpRow>(
            "SELECT id, title, description FROM menus ORDER BY created_at, id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let submenus = sqlx::query_as::<_, SubmenuDumpRow>(
            "SELECT id, menu_id, title, description FROM submenus ORDER BY created_at, id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let dishes = sqlx::query_as::<_, DishDumpRow>(
            "SELECT submenu_id, title, description, price_minor FROM dishes ORDER BY created_at, id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut dishes_by_submenu: HashMap<Uuid, Vec<DishExportNode>> = HashMap::new();
        for dish in dishes {
            dishes_by_submenu
                .entry(dish.submenu_id)
                .or_default()
                .push(DishExportNode {
                    title: dish.title,
                    description: dish.description,
                    price: Price::from_minor_units(dish.price_minor),
                });
        }

        let mut submenus_by_menu: HashMap<Uuid, Vec<SubmenuExportNode>> = HashMap::new();
        for submenu in submenus {
            let dishes = dishes_by_submenu.remove(&submenu.id).unwrap_or_default();
            submenus_by_menu
                .entry(submenu.menu_id)
                .or_default()
                .push(SubmenuExportNode {
                    title: submenu.title,
                    description: submenu.description,
                    dishes,
                });
        }

        Ok(menus
            .into_iter()
            .map(|menu| MenuExportNode {
                title: menu.title,
                description: menu.description,
                submenus: submenus_by_menu.remove(&menu.id).unwrap_or_default(),
            })
            .collect())
    }
}
