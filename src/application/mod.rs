//! Application services layer.

pub mod ancestry;
pub mod dishes;
pub mod error;
pub mod export;
pub mod jobs;
pub mod menus;
pub mod repos;
pub mod seed;
pub mod submenus;
