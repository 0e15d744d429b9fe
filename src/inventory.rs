//! Guarded inventory operations
//!
//! Every write that can break the user/asset link goes through here:
//! - asset inserts and updates confirm the owning user exists
//! - user deletes only touch users that no asset references
//!
//! Multi-step checks run inside a single store transaction so the check and
//! the write see the same rows.

use tracing::{info, warn};

use crate::model::{Asset, AssetDraft, AssetEdit, NewAsset, NewUser, User, UserEdit};
use crate::storage::InventoryStore;
use crate::validate::{self, Field, UserResolution};
use crate::{Entity, Error, ReferentialViolation, Result};

/// Integrity-checked operations over a borrowed store
pub struct Inventory<'a> {
    store: &'a InventoryStore,
}

impl<'a> Inventory<'a> {
    /// Create a new inventory view over `store`
    pub fn new(store: &'a InventoryStore) -> Self {
        Self { store }
    }

    /// The underlying store, for read-only queries
    pub fn store(&self) -> &'a InventoryStore {
        self.store
    }

    // ========== Users ==========

    /// Add a user after checking every field is non-empty
    pub fn add_user(&self, user: &NewUser) -> Result<i64> {
        let user = checked_user(user)?;
        let user_id = self.store.insert_user(&user)?;
        info!("Added user {} ({})", user_id, user.name);
        Ok(user_id)
    }

    /// Replace the fields named in `edit`, keeping the rest
    pub fn edit_user(&self, user_id: i64, edit: &UserEdit) -> Result<User> {
        self.store.with_transaction(|store| {
            let current = store
                .find_user_by_id(user_id)?
                .ok_or(Error::NotFound { entity: Entity::User, id: user_id })?;

            if edit.is_empty() {
                return Ok(current);
            }

            let row = checked_user(&edit.apply(&current))?;
            store.update_user(user_id, &row)?;
            info!("Updated user {}", user_id);

            Ok(User {
                user_id,
                name: row.name,
                email: row.email,
                department: row.department,
            })
        })
    }

    /// Users that can be removed: those no asset references
    pub fn deletable_users(&self) -> Result<Vec<User>> {
        self.store.list_users_without_assets()
    }

    /// Remove a user that owns no assets.
    ///
    /// Fails with `NotFound` for an unknown id and with
    /// `ReferentialViolation::UserHasAssets` while assets still point at the user;
    /// the row is left untouched in both cases.
    pub fn remove_user(&self, user_id: i64) -> Result<()> {
        self.store.with_transaction(|store| {
            if store.find_user_by_id(user_id)?.is_none() {
                return Err(Error::NotFound { entity: Entity::User, id: user_id });
            }

            let assets = store.count_assets_for_user(user_id)?;
            if assets > 0 {
                warn!("Refusing to remove user {} with {} asset(s)", user_id, assets);
                return Err(ReferentialViolation::UserHasAssets { user_id, assets }.into());
            }

            store.delete_user(user_id)?;
            info!("Removed user {}", user_id);
            Ok(())
        })
    }

    /// Look up the user named by raw id text
    pub fn resolve_user(&self, text: &str) -> Result<UserResolution> {
        validate::resolve_user(self.store, text)
    }

    // ========== Assets ==========

    /// Add an already-typed asset, provided its user exists
    pub fn add_asset(&self, asset: &NewAsset) -> Result<i64> {
        self.store.with_transaction(|store| {
            if store.find_user_by_id(asset.user_id)?.is_none() {
                warn!("Rejected asset '{}': user {} does not exist", asset.name, asset.user_id);
                return Err(ReferentialViolation::MissingUser { user_id: asset.user_id }.into());
            }
            let id = store.insert_asset(asset)?;
            info!("Added asset {} ({}) for user {}", id, asset.name, asset.user_id);
            Ok(id)
        })
    }

    /// Validate a raw draft and add it in one step
    pub fn submit_asset(&self, draft: &AssetDraft) -> Result<i64> {
        self.store.with_transaction(|store| {
            let asset = validate::check_asset_write(store, draft)?;
            let id = store.insert_asset(&asset)?;
            info!("Added asset {} ({}) for user {}", id, asset.name, asset.user_id);
            Ok(id)
        })
    }

    /// Replace the fields named in `edit`, keeping the rest.
    ///
    /// The merged row is validated again as a whole, so the date, price and
    /// owner are re-checked even when only the name changes.
    pub fn edit_asset(&self, id: i64, edit: &AssetEdit) -> Result<Asset> {
        self.store.with_transaction(|store| {
            let current = store
                .find_asset_by_id(id)?
                .ok_or(Error::NotFound { entity: Entity::Asset, id })?;

            if edit.is_empty() {
                return Ok(current);
            }

            let row = validate::check_asset_write(store, &edit.merge(&current))?;
            store.update_asset(id, &row)?;
            info!("Updated asset {}", id);

            Ok(Asset {
                id,
                name: row.name,
                category: row.category,
                purchase_date: row.purchase_date,
                purchase_price: row.purchase_price,
                status: row.status,
                location: row.location,
                user_id: row.user_id,
            })
        })
    }

    /// Remove an asset. Returns `false` when no such asset existed.
    pub fn remove_asset(&self, id: i64) -> Result<bool> {
        let removed = self.store.delete_asset(id)?;
        if removed {
            info!("Removed asset {}", id);
        }
        Ok(removed)
    }
}

fn checked_user(user: &NewUser) -> Result<NewUser> {
    Ok(NewUser {
        name: validate::require_text(Field::Name, &user.name)?,
        email: validate::require_text(Field::Email, &user.email)?,
        department: validate::require_text(Field::Department, &user.department)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationError;

    fn ada() -> NewUser {
        NewUser::new("Ada", "a@x.com", "Eng")
    }

    fn laptop(user_id: &str) -> AssetDraft {
        AssetDraft {
            name: "Laptop".to_string(),
            category: "HW".to_string(),
            purchase_date: "2024-01-15".to_string(),
            purchase_price: "999.0".to_string(),
            status: "Available".to_string(),
            location: "HQ".to_string(),
            user_id: user_id.to_string(),
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let store = InventoryStore::open_in_memory().unwrap();
        let inventory = Inventory::new(&store);

        let user_id = inventory.add_user(&ada()).unwrap();
        assert_eq!(user_id, 1);

        let asset_id = inventory.submit_asset(&laptop("1")).unwrap();
        assert_eq!(asset_id, 1);

        let rows = store.list_assets_with_user().unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(
            (
                row.asset.id,
                row.asset.name.as_str(),
                row.asset.category.as_str(),
                row.asset.purchase_date.to_string(),
                row.owner_name.as_str(),
                row.owner_department.as_str(),
            ),
            (1, "Laptop", "HW", "2024-01-15".to_string(), "Ada", "Eng")
        );

        assert!(matches!(
            inventory.remove_user(1),
            Err(Error::Referential(ReferentialViolation::UserHasAssets { user_id: 1, assets: 1 }))
        ));
        assert!(store.find_user_by_id(1).unwrap().is_some());

        assert!(inventory.remove_asset(1).unwrap());
        inventory.remove_user(1).unwrap();
        assert!(store.find_user_by_id(1).unwrap().is_none());
    }

    #[test]
    fn test_asset_with_missing_user_creates_no_row() {
        let store = InventoryStore::open_in_memory().unwrap();
        let inventory = Inventory::new(&store);

        let err = inventory.submit_asset(&laptop("7")).unwrap_err();
        assert!(matches!(
            err,
            Error::Referential(ReferentialViolation::MissingUser { user_id: 7 })
        ));
        assert!(err.is_recoverable());
        assert_eq!(store.count_assets().unwrap(), 0);

        let typed = NewAsset {
            name: "Phone".to_string(),
            category: "HW".to_string(),
            purchase_date: "2023-06-01".parse().unwrap(),
            purchase_price: 300.0,
            status: "In Use".to_string(),
            location: "Remote".to_string(),
            user_id: 7,
        };
        assert!(matches!(
            inventory.add_asset(&typed),
            Err(Error::Referential(ReferentialViolation::MissingUser { user_id: 7 }))
        ));
        assert_eq!(store.count_assets().unwrap(), 0);
    }

    #[test]
    fn test_add_user_rejects_blank_fields() {
        let store = InventoryStore::open_in_memory().unwrap();
        let inventory = Inventory::new(&store);

        let err = inventory.add_user(&NewUser::new("Ada", "", "Eng")).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::Empty(Field::Email))));
        assert_eq!(store.count_users().unwrap(), 0);
    }

    #[test]
    fn test_remove_unknown_user_is_not_found() {
        let store = InventoryStore::open_in_memory().unwrap();
        let inventory = Inventory::new(&store);

        assert!(matches!(
            inventory.remove_user(3),
            Err(Error::NotFound { entity: Entity::User, id: 3 })
        ));
    }

    #[test]
    fn test_remove_idle_user_removes_exactly_that_row() {
        let store = InventoryStore::open_in_memory().unwrap();
        let inventory = Inventory::new(&store);
        let keep = inventory.add_user(&ada()).unwrap();
        let gone = inventory.add_user(&NewUser::new("Grace", "g@x.com", "Ops")).unwrap();

        let deletable: Vec<i64> = inventory.deletable_users().unwrap().iter().map(|u| u.user_id).collect();
        assert_eq!(deletable, vec![keep, gone]);

        inventory.remove_user(gone).unwrap();
        let remaining: Vec<i64> = store.list_users().unwrap().iter().map(|u| u.user_id).collect();
        assert_eq!(remaining, vec![keep]);
    }

    #[test]
    fn test_remove_missing_asset_is_a_no_op() {
        let store = InventoryStore::open_in_memory().unwrap();
        let inventory = Inventory::new(&store);
        assert!(!inventory.remove_asset(12).unwrap());
    }

    #[test]
    fn test_empty_edits_change_nothing() {
        let store = InventoryStore::open_in_memory().unwrap();
        let inventory = Inventory::new(&store);
        let user_id = inventory.add_user(&ada()).unwrap();
        let asset_id = inventory.submit_asset(&laptop(&user_id.to_string())).unwrap();

        let user_before = store.find_user_by_id(user_id).unwrap().unwrap();
        let asset_before = store.find_asset_by_id(asset_id).unwrap().unwrap();

        let user_after = inventory.edit_user(user_id, &UserEdit::from_inputs("", "", "")).unwrap();
        let asset_after = inventory.edit_asset(asset_id, &AssetEdit::default()).unwrap();

        assert_eq!(user_after, user_before);
        assert_eq!(asset_after, asset_before);
        assert_eq!(store.find_user_by_id(user_id).unwrap().unwrap(), user_before);
        assert_eq!(store.find_asset_by_id(asset_id).unwrap().unwrap(), asset_before);
    }

    #[test]
    fn test_edit_asset_revalidates_replaced_fields() {
        let store = InventoryStore::open_in_memory().unwrap();
        let inventory = Inventory::new(&store);
        let user_id = inventory.add_user(&ada()).unwrap();
        let asset_id = inventory.submit_asset(&laptop(&user_id.to_string())).unwrap();

        let bad_date = AssetEdit {
            purchase_date: Some("2024-13-01".to_string()),
            ..AssetEdit::default()
        };
        assert!(matches!(
            inventory.edit_asset(asset_id, &bad_date),
            Err(Error::InvalidFields(_))
        ));

        let missing_owner = AssetEdit {
            user_id: Some("99".to_string()),
            ..AssetEdit::default()
        };
        assert!(matches!(
            inventory.edit_asset(asset_id, &missing_owner),
            Err(Error::Referential(ReferentialViolation::MissingUser { user_id: 99 }))
        ));

        let unchanged = store.find_asset_by_id(asset_id).unwrap().unwrap();
        assert_eq!(unchanged.user_id, user_id);
        assert_eq!(unchanged.purchase_date.to_string(), "2024-01-15");

        let moved = AssetEdit {
            status: Some("Out of Service".to_string()),
            purchase_price: Some("12.5".to_string()),
            ..AssetEdit::default()
        };
        let edited = inventory.edit_asset(asset_id, &moved).unwrap();
        assert_eq!(edited.status, "Out of Service");
        assert_eq!(edited.purchase_price, 12.5);
        assert_eq!(edited.name, "Laptop");
        assert_eq!(store.find_asset_by_id(asset_id).unwrap().unwrap(), edited);
    }

    #[test]
    fn test_edit_missing_records_are_not_found() {
        let store = InventoryStore::open_in_memory().unwrap();
        let inventory = Inventory::new(&store);

        assert!(matches!(
            inventory.edit_user(5, &UserEdit::from_inputs("x", "", "")),
            Err(Error::NotFound { entity: Entity::User, id: 5 })
        ));
        assert!(matches!(
            inventory.edit_asset(5, &AssetEdit::default()),
            Err(Error::NotFound { entity: Entity::Asset, id: 5 })
        ));
    }
}
