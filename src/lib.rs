//! # Asset Inventory
//!
//! Single-user tracker for personnel and the physical assets assigned to them.
//!
//! The crate provides:
//! - A SQLite-backed record store for users and assets
//! - Pure field validators (purchase dates, prices, identifiers)
//! - Guarded operations that keep every asset linked to an existing user
//! - An interactive menu shell driven over any `BufRead`/`Write` pair

pub mod model;
pub mod validate;
pub mod storage;
pub mod inventory;
pub mod shell;
pub mod ui;
pub mod config;

// Re-exports for convenient access
pub use model::{Asset, AssetDraft, AssetEdit, AssetWithOwner, NewAsset, NewUser, PurchaseDate, User, UserEdit};
pub use validate::{FieldError, ValidationError, UserResolution};
pub use storage::{InventoryStore, StoreStatus};
pub use inventory::Inventory;

/// Result type alias for inventory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Record kinds, used when reporting missing rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Asset,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::User => write!(f, "User"),
            Entity::Asset => write!(f, "Asset"),
        }
    }
}

/// Writes or deletes that would break the user/asset link
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferentialViolation {
    #[error("asset references user {user_id}, which does not exist")]
    MissingUser { user_id: i64 },

    #[error("user {user_id} is still assigned {assets} asset(s)")]
    UserHasAssets { user_id: i64, assets: usize },
}

/// Error types for inventory operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid fields: {}", validate::describe_failures(.0))]
    InvalidFields(Vec<FieldError>),

    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error("Referential violation: {0}")]
    Referential(#[from] ReferentialViolation),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl Error {
    /// Validation, lookup and referential failures can be handled by asking again.
    /// Storage faults cannot.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_storage_faults_are_fatal() {
        assert!(Error::from(ValidationError::Price("x".into())).is_recoverable());
        assert!(Error::NotFound { entity: Entity::Asset, id: 7 }.is_recoverable());
        assert!(Error::from(ReferentialViolation::MissingUser { user_id: 3 }).is_recoverable());
        assert!(!Error::Storage(rusqlite::Error::QueryReturnedNoRows).is_recoverable());
    }
}
