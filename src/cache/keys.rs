//! Cache key definitions.
//!
//! Keys mirror the response surface: one key per detail payload and one
//! list key per resource scope. List keys for submenus and dishes carry
//! their ancestor ids so sibling scopes never collide.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Top-level menu list, including aggregate counts.
    MenuList,
    Menu(Uuid),
    SubmenuList { menu_id: Uuid },
    Submenu(Uuid),
    DishList { menu_id: Uuid, submenu_id: Uuid },
    Dish(Uuid),
}

impl CacheKey {
    /// Stable key-family label for logs and metrics.
    pub fn family(&self) -> &'static str {
        match self {
            CacheKey::MenuList => "menu-list",
            CacheKey::Menu(_) => "menu",
            CacheKey::SubmenuList { .. } => "submenu-list",
            CacheKey::Submenu(_) => "submenu",
            CacheKey::DishList { .. } => "dish-list",
            CacheKey::Dish(_) => "dish",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_list_keys_do_not_collide() {
        let menu_a = Uuid::new_v4();
        let menu_b = Uuid::new_v4();

        assert_ne!(
            CacheKey::SubmenuList { menu_id: menu_a },
            CacheKey::SubmenuList { menu_id: menu_b }
        );

        let submenu = Uuid::new_v4();
        assert_ne!(
            CacheKey::DishList {
                menu_id: menu_a,
                submenu_id: submenu
            },
            CacheKey::DishList {
                menu_id: menu_b,
                submenu_id: submenu
            }
        );
    }

    #[test]
    fn detail_and_list_families_are_distinct() {
        let id = Uuid::nil();
        assert_eq!(CacheKey::Menu(id).family(), "menu");
        assert_eq!(CacheKey::MenuList.family(), "menu-list");
        assert_ne!(CacheKey::Menu(id), CacheKey::Submenu(id));
    }
}
