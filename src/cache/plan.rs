//! Invalidation plan generation.
//!
//! Each entity kind declares the full set of keys affected by one of its
//! mutations, computed here once instead of enumerated at call sites.
//! Every plan includes the top-level menu list: menu aggregate counts
//! change whenever any descendant changes, so the broad invalidation is
//! the correctness baseline.

use uuid::Uuid;

use super::keys::CacheKey;

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidationPlan {
    keys: Vec<CacheKey>,
}

impl InvalidationPlan {
    /// Keys touched by creating, updating or deleting a menu.
    ///
    /// `menu_id` is absent for creation, where no detail payload can be
    /// cached yet.
    pub fn menu_written(menu_id: Option<Uuid>) -> Self {
        let mut keys = Vec::with_capacity(2);
        if let Some(id) = menu_id {
            keys.push(CacheKey::Menu(id));
        }
        keys.push(CacheKey::MenuList);
        Self { keys }
    }

    /// Keys touched by a submenu write under `menu_id`.
    pub fn submenu_written(menu_id: Uuid, submenu_id: Option<Uuid>) -> Self {
        let mut keys = Vec::with_capacity(4);
        keys.push(CacheKey::Menu(menu_id));
        if let Some(id) = submenu_id {
            keys.push(CacheKey::Submenu(id));
        }
        keys.push(CacheKey::SubmenuList { menu_id });
        keys.push(CacheKey::MenuList);
        Self { keys }
    }

    /// Keys touched by a dish write under `menu_id`/`submenu_id`.
    pub fn dish_written(menu_id: Uuid, submenu_id: Uuid, dish_id: Option<Uuid>) -> Self {
        let mut keys = Vec::with_capacity(6);
        keys.push(CacheKey::Menu(menu_id));
        keys.push(CacheKey::Submenu(submenu_id));
        if let Some(id) = dish_id {
            keys.push(CacheKey::Dish(id));
        }
        keys.push(CacheKey::SubmenuList { menu_id });
        keys.push(CacheKey::DishList {
            menu_id,
            submenu_id,
        });
        keys.push(CacheKey::MenuList);
        Self { keys }
    }

    /// Keys touched by bulk-seeding demo data.
    ///
    /// Seeded rows are new, so only the already-cached top-level list can
    /// be stale.
    pub fn seed_completed() -> Self {
        Self {
            keys: vec![CacheKey::MenuList],
        }
    }

    pub fn keys(&self) -> &[CacheKey] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_create_touches_only_the_list() {
        let plan = InvalidationPlan::menu_written(None);
        assert_eq!(plan.keys(), &[CacheKey::MenuList]);
    }

    #[test]
    fn menu_update_touches_detail_and_list() {
        let id = Uuid::new_v4();
        let plan = InvalidationPlan::menu_written(Some(id));
        assert_eq!(plan.keys(), &[CacheKey::Menu(id), CacheKey::MenuList]);
    }

    #[test]
    fn submenu_write_reaches_parent_detail_and_menu_list() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let plan = InvalidationPlan::submenu_written(menu_id, Some(submenu_id));

        assert!(plan.keys().contains(&CacheKey::Menu(menu_id)));
        assert!(plan.keys().contains(&CacheKey::Submenu(submenu_id)));
        assert!(plan.keys().contains(&CacheKey::SubmenuList { menu_id }));
        assert!(plan.keys().contains(&CacheKey::MenuList));
    }

    #[test]
    fn dish_write_fans_out_across_the_ancestor_chain() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let dish_id = Uuid::new_v4();
        let plan = InvalidationPlan::dish_written(menu_id, submenu_id, Some(dish_id));

        assert!(plan.keys().contains(&CacheKey::Dish(dish_id)));
        assert!(plan.keys().contains(&CacheKey::DishList {
            menu_id,
            submenu_id
        }));
        assert!(plan.keys().contains(&CacheKey::SubmenuList { menu_id }));
        assert!(plan.keys().contains(&CacheKey::Submenu(submenu_id)));
        assert!(plan.keys().contains(&CacheKey::Menu(menu_id)));
        assert!(plan.keys().contains(&CacheKey::MenuList));
    }

    #[test]
    fn dish_create_has_no_detail_key() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let plan = InvalidationPlan::dish_written(menu_id, submenu_id, None);

        assert!(
            !plan
                .keys()
                .iter()
                .any(|key| matches!(key, CacheKey::Dish(_)))
        );
    }
}
