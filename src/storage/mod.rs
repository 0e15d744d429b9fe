//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - users(user_id, name, email, department)
//! - assets(id, name, category, purchase_date, purchase_price, status, location, user_id)

pub mod schema;
pub mod sqlite;

pub use sqlite::{InventoryStats, InventoryStore, StoreStatus};
