//! # pothub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter. Implements the `PotStore` and
//! `UserDirectory` ports from `pothub-app` on top of `sqlx`.
//!
//! ## Responsibilities
//! - Own the connection pool and run migrations
//! - Map domain types to/from rows (geometry and care metadata stored as
//!   JSON columns, history in its own table so rowid preserves append order)
//! - Enforce ownership scoping in SQL so "missing" and "not owned" are the
//!   same observable outcome
//!
//! ## Dependency rule
//! Depends on `pothub-app` and `pothub-domain`. Never imported by them.

mod error;
mod pool;
mod pot_store;
mod user_directory;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use pot_store::SqlitePotStore;
pub use user_directory::SqliteUserDirectory;
