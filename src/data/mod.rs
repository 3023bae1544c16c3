//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite database operations
//! - Row models and choice enums
//! - Pagination primitives

mod database;
mod models;

pub use database::{ColumnFilter, DUPLICATE_EMAIL_MESSAGE, Database, FilterValue};
pub use models::*;

#[cfg(test)]
mod database_test;
