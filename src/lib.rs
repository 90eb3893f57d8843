//! Mensa: a hierarchical menu-management service.
//!
//! Menus contain submenus, submenus contain dishes. The HTTP layer feeds
//! entity services that orchestrate Postgres repositories and a
//! read-through response cache; a background worker exports the full
//! hierarchy as a CSV spreadsheet.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
