//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use tracing::{debug, info, warn};
use crate::{Error, Result};
use crate::model::{Asset, AssetWithOwner, NewAsset, NewUser, User};
use crate::validate::{self, ValidationError};
use super::schema;

const USER_COLUMNS: &str = "user_id, name, email, department";
const ASSET_COLUMNS: &str =
    "id, name, category, purchase_date, purchase_price, status, location, user_id";

/// Whether `initialize` had to create the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Created,
    Existing,
}

/// SQLite-backed storage for users and assets.
///
/// The store performs no referential checks of its own; see
/// [`crate::Inventory`] for the guarded operations.
pub struct InventoryStore {
    conn: Connection,
    status: StoreStatus,
}

impl InventoryStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn, status: StoreStatus::Existing };
        store.status = store.initialize()?;
        match store.status {
            StoreStatus::Created => info!("Created inventory database at {}", path.display()),
            StoreStatus::Existing => debug!("Loaded inventory database at {}", path.display()),
        }
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn, status: StoreStatus::Existing };
        store.status = store.initialize()?;
        Ok(store)
    }

    /// Status reported by the `initialize` run during `open`
    pub fn status(&self) -> StoreStatus {
        self.status
    }

    /// Create the users and assets tables if they are missing.
    /// Safe to call repeatedly; only the first call on a fresh database reports `Created`.
    pub fn initialize(&self) -> Result<StoreStatus> {
        let mut existing = 0;
        for table in schema::TABLE_NAMES {
            if self.table_exists(table)? {
                existing += 1;
            }
        }

        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }

        if existing == schema::TABLE_NAMES.len() {
            Ok(StoreStatus::Existing)
        } else {
            Ok(StoreStatus::Created)
        }
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok`; any error (or panic) drops the
    /// transaction, which rolls it back.
    pub fn with_transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    // ========== User Operations ==========

    /// Insert a user, returning the assigned id
    pub fn insert_user(&self, user: &NewUser) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO users (name, email, department) VALUES (?1, ?2, ?3)",
            params![user.name, user.email, user.department],
        )?;
        let user_id = self.conn.last_insert_rowid();
        debug!("Inserted user {}", user_id);
        Ok(user_id)
    }

    /// Get a user by id
    pub fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
                [user_id],
                row_to_user,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All users, ordered by id
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY user_id"))?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(users)
    }

    /// Users that no asset references
    pub fn list_users_without_assets(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users u
             WHERE NOT EXISTS (SELECT 1 FROM assets a WHERE a.user_id = u.user_id)
             ORDER BY u.user_id"
        ))?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(users)
    }

    /// Overwrite a user row. Returns whether the row existed.
    pub fn update_user(&self, user_id: i64, user: &NewUser) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET name = ?1, email = ?2, department = ?3 WHERE user_id = ?4",
            params![user.name, user.email, user.department, user_id],
        )?;
        debug!("Updated user {} ({} row(s))", user_id, changed);
        Ok(changed > 0)
    }

    /// Delete a user row, referenced or not. Returns whether the row existed.
    pub fn delete_user(&self, user_id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM users WHERE user_id = ?1", [user_id])?;
        debug!("Deleted user {} ({} row(s))", user_id, changed);
        Ok(changed > 0)
    }

    /// Count all users
    pub fn count_users(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Asset Operations ==========

    /// Insert an asset, returning the assigned id.
    /// The owning user is not checked here.
    pub fn insert_asset(&self, asset: &NewAsset) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO assets (name, category, purchase_date, purchase_price, status, location, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                asset.name,
                asset.category,
                asset.purchase_date.to_string(),
                asset.purchase_price,
                asset.status,
                asset.location,
                asset.user_id,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted asset {} for user {}", id, asset.user_id);
        Ok(id)
    }

    /// Get an asset by id
    pub fn find_asset_by_id(&self, id: i64) -> Result<Option<Asset>> {
        self.conn
            .query_row(
                &format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?1"),
                [id],
                row_to_asset,
            )
            .optional()
            .map_err(|e| match unreadable_date(&e) {
                Some(date_err) => Error::Validation(date_err),
                None => e.into(),
            })
    }

    /// Assets joined with their owner's name and department, ordered by asset id.
    ///
    /// This is an inner join: an asset whose user row is gone does not appear.
    /// Rows whose purchase date cannot be read are skipped with a warning.
    pub fn list_assets_with_user(&self) -> Result<Vec<AssetWithOwner>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT a.id, a.name, a.category, a.purchase_date, a.purchase_price,
                   a.status, a.location, a.user_id, u.name, u.department
            FROM assets a
            JOIN users u ON a.user_id = u.user_id
            ORDER BY a.id
            "#,
        )?;

        let mapped = stmt.query_map([], |row| {
            Ok(AssetWithOwner {
                asset: row_to_asset(row)?,
                owner_name: row.get(8)?,
                owner_department: row.get(9)?,
            })
        })?;

        let mut rows = Vec::new();
        for row in mapped {
            match row {
                Ok(row) => rows.push(row),
                Err(e) => match unreadable_date(&e) {
                    Some(date_err) => warn!("Skipping asset in listing: {}", date_err),
                    None => return Err(e.into()),
                },
            }
        }

        Ok(rows)
    }

    /// Overwrite an asset row. Returns whether the row existed.
    /// The owning user is not checked here.
    pub fn update_asset(&self, id: i64, asset: &NewAsset) -> Result<bool> {
        let changed = self.conn.execute(
            r#"
            UPDATE assets
            SET name = ?1, category = ?2, purchase_date = ?3, purchase_price = ?4,
                status = ?5, location = ?6, user_id = ?7
            WHERE id = ?8
            "#,
            params![
                asset.name,
                asset.category,
                asset.purchase_date.to_string(),
                asset.purchase_price,
                asset.status,
                asset.location,
                asset.user_id,
                id,
            ],
        )?;
        debug!("Updated asset {} ({} row(s))", id, changed);
        Ok(changed > 0)
    }

    /// Delete an asset row. Returns whether the row existed.
    pub fn delete_asset(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM assets WHERE id = ?1", [id])?;
        debug!("Deleted asset {} ({} row(s))", id, changed);
        Ok(changed > 0)
    }

    /// Count all assets
    pub fn count_assets(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count the assets assigned to one user
    pub fn count_assets_for_user(&self, user_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM assets WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get inventory statistics
    pub fn stats(&self) -> Result<InventoryStats> {
        let total_value: Option<f64> =
            self.conn
                .query_row("SELECT SUM(purchase_price) FROM assets", [], |row| row.get(0))?;

        Ok(InventoryStats {
            users: self.count_users()?,
            assets: self.count_assets()?,
            idle_users: self.list_users_without_assets()?.len(),
            total_value: total_value.unwrap_or(0.0),
        })
    }
}

/// Helper to convert a row to a User
fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        department: row.get(3)?,
    })
}

/// Helper to convert a row to an Asset.
///
/// A NULL price reads back as NaN (SQLite stores NaN as NULL); NULL status
/// and location read as empty text; a NULL owner reads as 0, which no user has.
fn row_to_asset(row: &rusqlite::Row) -> rusqlite::Result<Asset> {
    let date_str: String = row.get(3)?;
    let purchase_date = validate::parse_stored_date(&date_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Asset {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        purchase_date,
        purchase_price: row.get::<_, Option<f64>>(4)?.unwrap_or(f64::NAN),
        status: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        location: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        user_id: row.get::<_, Option<i64>>(7)?.unwrap_or(0),
    })
}

/// The date error behind a failed asset row, if that is what failed
fn unreadable_date(err: &rusqlite::Error) -> Option<ValidationError> {
    match err {
        rusqlite::Error::FromSqlConversionFailure(3, _, inner) => {
            inner.downcast_ref::<ValidationError>().cloned()
        }
        _ => None,
    }
}

/// Inventory statistics
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct InventoryStats {
    pub users: usize,
    pub assets: usize,
    /// Users with no assigned assets
    pub idle_users: usize,
    /// Sum of every asset's purchase price
    pub total_value: f64,
}

impl std::fmt::Display for InventoryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Inventory Statistics:")?;
        writeln!(f, "  Users: {}", self.users)?;
        writeln!(f, "  Assets: {}", self.assets)?;
        writeln!(f, "  Users without assets: {}", self.idle_users)?;
        writeln!(f, "  Total purchase value: {:.2}", self.total_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_asset(user_id: i64) -> NewAsset {
        NewAsset {
            name: "Laptop".to_string(),
            category: "HW".to_string(),
            purchase_date: "2024-01-15".parse().unwrap(),
            purchase_price: 999.0,
            status: "Available".to_string(),
            location: "HQ".to_string(),
            user_id,
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let store = InventoryStore::open_in_memory().unwrap();
        assert_eq!(store.status(), StoreStatus::Created);
        assert_eq!(store.initialize().unwrap(), StoreStatus::Existing);
        assert_eq!(store.initialize().unwrap(), StoreStatus::Existing);
    }

    #[test]
    fn test_reopening_a_file_reports_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.db");

        let store = InventoryStore::open(&path).unwrap();
        assert_eq!(store.status(), StoreStatus::Created);
        store.insert_user(&NewUser::new("Ada", "a@x.com", "Eng")).unwrap();
        drop(store);

        let store = InventoryStore::open(&path).unwrap();
        assert_eq!(store.status(), StoreStatus::Existing);
        assert_eq!(store.count_users().unwrap(), 1);
    }

    #[test]
    fn test_user_crud() {
        let store = InventoryStore::open_in_memory().unwrap();

        let id = store.insert_user(&NewUser::new("Ada", "a@x.com", "Eng")).unwrap();
        let user = store.find_user_by_id(id).unwrap().unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.department, "Eng");

        assert!(store.update_user(id, &NewUser::new("Grace", "g@x.com", "Ops")).unwrap());
        assert_eq!(store.find_user_by_id(id).unwrap().unwrap().name, "Grace");
        assert!(!store.update_user(id + 1, &NewUser::new("x", "y", "z")).unwrap());

        assert!(store.delete_user(id).unwrap());
        assert!(!store.delete_user(id).unwrap());
        assert!(store.find_user_by_id(id).unwrap().is_none());
    }

    #[test]
    fn test_asset_read_after_write() {
        let store = InventoryStore::open_in_memory().unwrap();
        let user_id = store.insert_user(&NewUser::new("Ada", "a@x.com", "Eng")).unwrap();

        let new_asset = sample_asset(user_id);
        let id = store.insert_asset(&new_asset).unwrap();

        let asset = store.find_asset_by_id(id).unwrap().unwrap();
        assert_eq!(asset.id, id);
        assert_eq!(NewAsset::from(&asset), new_asset);
        assert!(store.find_asset_by_id(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_join_excludes_orphaned_assets() {
        let store = InventoryStore::open_in_memory().unwrap();
        let user_id = store.insert_user(&NewUser::new("Ada", "a@x.com", "Eng")).unwrap();

        store.insert_asset(&sample_asset(user_id)).unwrap();
        // The store itself does not guard the link
        store.insert_asset(&sample_asset(404)).unwrap();
        assert_eq!(store.count_assets().unwrap(), 2);

        let rows = store.list_assets_with_user().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].asset.user_id, user_id);
        assert_eq!(rows[0].owner_name, "Ada");
        assert_eq!(rows[0].owner_department, "Eng");
    }

    #[test]
    fn test_anti_join_lists_idle_users() {
        let store = InventoryStore::open_in_memory().unwrap();
        let busy = store.insert_user(&NewUser::new("Ada", "a@x.com", "Eng")).unwrap();
        let idle = store.insert_user(&NewUser::new("Grace", "g@x.com", "Ops")).unwrap();
        store.insert_asset(&sample_asset(busy)).unwrap();

        let users = store.list_users_without_assets().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user_id, idle);

        assert_eq!(store.list_users().unwrap().len(), 2);
        assert_eq!(store.count_assets_for_user(busy).unwrap(), 1);
        assert_eq!(store.count_assets_for_user(idle).unwrap(), 0);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let store = InventoryStore::open_in_memory().unwrap();

        let result: Result<()> = store.with_transaction(|s| {
            s.insert_user(&NewUser::new("Ada", "a@x.com", "Eng"))?;
            Err(crate::Error::NotFound { entity: crate::Entity::User, id: 1 })
        });
        assert!(result.is_err());
        assert_eq!(store.count_users().unwrap(), 0);

        store
            .with_transaction(|s| s.insert_user(&NewUser::new("Ada", "a@x.com", "Eng")))
            .unwrap();
        assert_eq!(store.count_users().unwrap(), 1);
    }

    #[test]
    fn test_stats() {
        let store = InventoryStore::open_in_memory().unwrap();
        let user_id = store.insert_user(&NewUser::new("Ada", "a@x.com", "Eng")).unwrap();
        store.insert_user(&NewUser::new("Grace", "g@x.com", "Ops")).unwrap();
        store.insert_asset(&sample_asset(user_id)).unwrap();
        let mut cheap = sample_asset(user_id);
        cheap.purchase_price = 1.0;
        store.insert_asset(&cheap).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.users, 2);
        assert_eq!(stats.assets, 2);
        assert_eq!(stats.idle_users, 1);
        assert!((stats.total_value - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_prices_read_back() {
        let store = InventoryStore::open_in_memory().unwrap();
        let user_id = store.insert_user(&NewUser::new("Ada", "a@x.com", "Eng")).unwrap();

        let mut lamp = sample_asset(user_id);
        lamp.purchase_price = f64::NAN;
        let nan_id = store.insert_asset(&lamp).unwrap();
        lamp.purchase_price = f64::INFINITY;
        let inf_id = store.insert_asset(&lamp).unwrap();

        assert!(store.find_asset_by_id(nan_id).unwrap().unwrap().purchase_price.is_nan());
        assert_eq!(
            store.find_asset_by_id(inf_id).unwrap().unwrap().purchase_price,
            f64::INFINITY
        );

        let rows = store.list_assets_with_user().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].asset.purchase_price.is_nan());
    }

    #[test]
    fn test_opens_files_with_nullable_columns_and_loose_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assetInventory.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE users (
                    user_id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    department TEXT NOT NULL
                 );
                 CREATE TABLE assets (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    category TEXT NOT NULL,
                    purchase_date TEXT NOT NULL,
                    purchase_price REAL,
                    status TEXT,
                    location TEXT,
                    user_id INTEGER,
                    FOREIGN KEY (user_id) REFERENCES users(user_id)
                 );
                 INSERT INTO users (name, email, department) VALUES ('Ada', 'a@x.com', 'Eng');
                 INSERT INTO assets (name, category, purchase_date, purchase_price, status, location, user_id)
                    VALUES ('Lamp', 'HW', '2024-1-015', NULL, NULL, NULL, 1);
                 INSERT INTO assets (name, category, purchase_date, purchase_price, status, location, user_id)
                    VALUES ('Desk', 'Furniture', 'someday', 10.0, 'Available', 'HQ', 1);",
            )
            .unwrap();
        }

        let store = InventoryStore::open(&path).unwrap();
        assert_eq!(store.status(), StoreStatus::Existing);

        let rows = store.list_assets_with_user().unwrap();
        assert_eq!(rows.len(), 1);
        let lamp = &rows[0].asset;
        assert_eq!(lamp.name, "Lamp");
        assert_eq!(lamp.purchase_date.to_string(), "2024-01-15");
        assert!(lamp.purchase_price.is_nan());
        assert_eq!(lamp.status, "");
        assert_eq!(lamp.location, "");

        let err = store.find_asset_by_id(2).unwrap_err();
        assert!(matches!(err, crate::Error::Validation(ValidationError::Date(_))));
        assert!(err.is_recoverable());
        assert_eq!(store.count_assets().unwrap(), 2);
    }
}
