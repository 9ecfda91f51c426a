//! Database module: models and schema for the country cache.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: `CountryStorage`, the only code that issues SQL

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{CountryRecord, DbCountry, DbRefreshMetadata};
pub use schema::SQLITE_INIT;
pub use sqlite::{CountryFilter, CountryStorage, SqlitePool};
