//! Record types
//!
//! Two record kinds are tracked:
//! - `User`: a person who can be assigned assets
//! - `Asset`: a physical item, always assigned to exactly one user
//!
//! Each kind comes in three shapes: the stored row (with its surrogate key),
//! the `New*` row about to be written, and an edit that only carries the
//! fields being replaced.

use crate::validate;
use serde::Serialize;
use std::str::FromStr;

/// Status values offered when prompting. The column itself is free text.
pub const SUGGESTED_STATUSES: &[&str] = &["Available", "In Use", "Out of Service"];

/// A `YYYY-MM-DD` purchase date.
///
/// Day-of-month is only range checked (1-31); `2024-02-30` is a valid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct PurchaseDate {
    year: u16,
    month: u8,
    day: u8,
}

impl PurchaseDate {
    pub(crate) fn from_parts(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl FromStr for PurchaseDate {
    type Err = validate::ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        validate::validate_date(s)
    }
}

impl std::fmt::Display for PurchaseDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl From<PurchaseDate> for String {
    fn from(date: PurchaseDate) -> Self {
        date.to_string()
    }
}

/// A stored user row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub department: String,
}

/// User fields about to be inserted or written over an existing row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub department: String,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            department: department.into(),
        }
    }
}

impl From<&User> for NewUser {
    fn from(user: &User) -> Self {
        Self::new(user.name.clone(), user.email.clone(), user.department.clone())
    }
}

/// Selective replacement of user fields. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserEdit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

impl UserEdit {
    /// Build an edit from raw answers; blank answers keep the current value.
    pub fn from_inputs(name: &str, email: &str, department: &str) -> Self {
        Self {
            name: non_blank(name),
            email: non_blank(email),
            department: non_blank(department),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.department.is_none()
    }

    /// The full row that results from applying this edit to `current`
    pub fn apply(&self, current: &User) -> NewUser {
        NewUser {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            email: self.email.clone().unwrap_or_else(|| current.email.clone()),
            department: self
                .department
                .clone()
                .unwrap_or_else(|| current.department.clone()),
        }
    }
}

/// A stored asset row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub purchase_date: PurchaseDate,
    pub purchase_price: f64,
    pub status: String,
    pub location: String,
    pub user_id: i64,
}

/// Validated asset fields about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub name: String,
    pub category: String,
    pub purchase_date: PurchaseDate,
    pub purchase_price: f64,
    pub status: String,
    pub location: String,
    pub user_id: i64,
}

impl From<&Asset> for NewAsset {
    fn from(asset: &Asset) -> Self {
        Self {
            name: asset.name.clone(),
            category: asset.category.clone(),
            purchase_date: asset.purchase_date,
            purchase_price: asset.purchase_price,
            status: asset.status.clone(),
            location: asset.location.clone(),
            user_id: asset.user_id,
        }
    }
}

/// Raw, unvalidated asset fields as collected from the user.
///
/// Turned into a `NewAsset` by [`crate::validate::check_asset_write`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetDraft {
    pub name: String,
    pub category: String,
    pub purchase_date: String,
    pub purchase_price: String,
    pub status: String,
    pub location: String,
    pub user_id: String,
}

/// Selective replacement of asset fields, still in raw text form.
/// `None` keeps the stored value; replaced fields are validated again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetEdit {
    pub name: Option<String>,
    pub category: Option<String>,
    pub purchase_date: Option<String>,
    pub purchase_price: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub user_id: Option<String>,
}

impl AssetEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.purchase_date.is_none()
            && self.purchase_price.is_none()
            && self.status.is_none()
            && self.location.is_none()
            && self.user_id.is_none()
    }

    /// Fill every untouched field from `current`, producing a complete draft
    pub fn merge(&self, current: &Asset) -> AssetDraft {
        fn pick(edit: &Option<String>, current: String) -> String {
            edit.clone().unwrap_or(current)
        }

        AssetDraft {
            name: pick(&self.name, current.name.clone()),
            category: pick(&self.category, current.category.clone()),
            purchase_date: pick(&self.purchase_date, current.purchase_date.to_string()),
            purchase_price: pick(&self.purchase_price, current.purchase_price.to_string()),
            status: pick(&self.status, current.status.clone()),
            location: pick(&self.location, current.location.clone()),
            user_id: pick(&self.user_id, current.user_id.to_string()),
        }
    }
}

/// One row of the inventory listing: an asset joined with its owner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetWithOwner {
    #[serde(flatten)]
    pub asset: Asset,
    pub owner_name: String,
    pub owner_department: String,
}

/// Treat blank input as "no answer"
pub fn non_blank(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
