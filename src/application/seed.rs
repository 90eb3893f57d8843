//! Demo-data seeding.
//!
//! Inserts a small fixed fixture so a fresh deployment has something to
//! browse. Each entity is committed independently; a failure partway
//! leaves the earlier entities in place (documented behavior, the seed is
//! not atomic).

use std::sync::Arc;

use tracing::info;

use crate::application::error::ServiceError;
use crate::application::repos::{
    CreateDishParams, CreateMenuParams, CreateSubmenuParams, DishesWriteRepo, MenusWriteRepo,
    SubmenusWriteRepo,
};
use crate::cache::{InvalidationPlan, ResponseCache};
use crate::domain::price::Price;

struct SeedDish {
    title: &'static str,
    description: &'static str,
    price_minor: i64,
}

struct SeedSubmenu {
    title: &'static str,
    description: &'static str,
    dishes: &'static [SeedDish],
}

struct SeedMenu {
    title: &'static str,
    description: &'static str,
    submenus: &'static [SeedSubmenu],
}

const FIXTURE: &[SeedMenu] = &[
    SeedMenu {
        title: "Main menu",
        description: "The timeless classics",
        submenus: &[
            SeedSubmenu {
                title: "Soups",
                description: "Served with a spoon",
                dishes: &[
                    SeedDish {
                        title: "Borscht",
                        description: "Beetroot, slow-simmered",
                        price_minor: 25150,
                    },
                    SeedDish {
                        title: "Chicken noodle soup",
                        description: "Fixes most problems",
                        price_minor: 18000,
                    },
                ],
            },
            SeedSubmenu {
                title: "Mains",
                description: "Generous portions",
                dishes: &[
                    SeedDish {
                        title: "Pot roast",
                        description: "Potatoes cooked through, guaranteed",
                        price_minor: 23580,
                    },
                    SeedDish {
                        title: "Bolognese",
                        description: "Not Italian either",
                        price_minor: 26700,
                    },
                    SeedDish {
                        title: "Baked fish",
                        description: "Once lived in the sea",
                        price_minor: 33530,
                    },
                ],
            },
        ],
    },
    SeedMenu {
        title: "Seasonal menu",
        description: "Changes with the weather",
        submenus: &[
            SeedSubmenu {
                title: "Cold dishes",
                description: "For warmer days",
                dishes: &[
                    SeedDish {
                        title: "Okroshka",
                        description: "Some people genuinely like it",
                        price_minor: 19050,
                    },
                    SeedDish {
                        title: "Aspic",
                        description: "Wobbles on arrival",
                        price_minor: 23040,
                    },
                ],
            },
            SeedSubmenu {
                title: "Drinks",
                description: "Every day is Friday",
                dishes: &[
                    SeedDish {
                        title: "Mulled wine",
                        description: "Warms inside and out",
                        price_minor: 14000,
                    },
                    SeedDish {
                        title: "Mojito",
                        description: "Straight rum might be better",
                        price_minor: 20005,
                    },
                ],
            },
        ],
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub menus: usize,
    pub submenus: usize,
    pub dishes: usize,
}

#[derive(Clone)]
pub struct SeedService {
    menus: Arc<dyn MenusWriteRepo>,
    submenus: Arc<dyn SubmenusWriteRepo>,
    dishes: Arc<dyn DishesWriteRepo>,
    cache: Arc<ResponseCache>,
}

impl SeedService {
    pub fn new(
        menus: Arc<dyn MenusWriteRepo>,
        submenus: Arc<dyn SubmenusWriteRepo>,
        dishes: Arc<dyn DishesWriteRepo>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            menus,
            submenus,
            dishes,
            cache,
        }
    }

    pub async fn seed_demo_data(&self) -> Result<SeedOutcome, ServiceError> {
        let mut outcome = SeedOutcome::default();

        for menu in FIXTURE {
            let created_menu = self
                .menus
                .create_menu(CreateMenuParams {
                    title: menu.title.to_string(),
                    description: menu.description.to_string(),
                })
                .await?;
            outcome.menus += 1;

            for submenu in menu.submenus {
                let created_submenu = self
                    .submenus
                    .create_submenu(
                        created_menu.id,
                        CreateSubmenuParams {
                            title: submenu.title.to_string(),
                            description: submenu.description.to_string(),
                        },
                    )
                    .await?;
                outcome.submenus += 1;

                for dish in submenu.dishes {
                    self.dishes
                        .create_dish(
                            created_submenu.id,
                            CreateDishParams {
                                title: dish.title.to_string(),
                                description: dish.description.to_string(),
                                price: Price::from_minor_units(dish.price_minor),
                            },
                        )
                        .await?;
                    outcome.dishes += 1;
                }
            }
        }

        self.cache.apply(&InvalidationPlan::seed_completed());

        info!(
            target = "mensa::seed",
            menus = outcome.menus,
            submenus = outcome.submenus,
            dishes = outcome.dishes,
            "demo data seeded"
        );

        Ok(outcome)
    }
}
