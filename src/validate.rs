//! Field validation
//!
//! Pure parsers for the raw text an operator types in, plus the two checks
//! that need the store: resolving a user id and vetting a complete asset
//! draft before it is written. Nothing here prompts or retries; callers loop.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::model::{AssetDraft, NewAsset, PurchaseDate, User};
use crate::storage::InventoryStore;
use crate::{Error, ReferentialViolation, Result};

static DATE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn date_pattern() -> &'static Regex {
    DATE_PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("date pattern is a valid regex")
    })
}

/// Fields that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Department,
    Category,
    PurchaseDate,
    PurchasePrice,
    UserId,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Department => "department",
            Field::Category => "category",
            Field::PurchaseDate => "purchase_date",
            Field::PurchasePrice => "purchase_price",
            Field::UserId => "user_id",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Malformed input for a single field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid date '{0}': use YYYY-MM-DD with valid year, month, and day values")]
    Date(String),

    #[error("invalid price '{0}': enter a valid number")]
    Price(String),

    #[error("invalid id '{0}': enter a valid integer")]
    Id(String),

    #[error("{0} must not be empty")]
    Empty(Field),
}

/// A validation failure tagged with the field it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub error: ValidationError,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

pub(crate) fn describe_failures(failures: &[FieldError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse a `YYYY-MM-DD` date.
///
/// Accepts exactly ten ASCII characters with year in 1000..=9999, month in
/// 1..=12 and day in 1..=31. The day is not checked against the month, so
/// `2024-02-30` passes.
pub fn validate_date(text: &str) -> std::result::Result<PurchaseDate, ValidationError> {
    let invalid = || ValidationError::Date(text.to_string());

    if text.len() != 10 {
        return Err(invalid());
    }
    let caps = date_pattern().captures(text).ok_or_else(invalid)?;

    let year: u16 = caps[1].parse().map_err(|_| invalid())?;
    let month: u8 = caps[2].parse().map_err(|_| invalid())?;
    let day: u8 = caps[3].parse().map_err(|_| invalid())?;

    if !(1000..=9999).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }

    Ok(PurchaseDate::from_parts(year, month, day))
}

/// Parse a date already stored in the database.
///
/// Tries the strict form first. Older inventory files also hold dates such
/// as `2024-1-015`: ten characters, three dash-separated integers, in range.
/// Those are read back as the same day and written in canonical form on
/// the next update.
pub(crate) fn parse_stored_date(text: &str) -> std::result::Result<PurchaseDate, ValidationError> {
    if let Ok(date) = validate_date(text) {
        return Ok(date);
    }

    let invalid = || ValidationError::Date(text.to_string());
    if text.chars().count() != 10 {
        return Err(invalid());
    }

    let parts = text
        .split('-')
        .map(|part| part.trim().parse::<i64>().map_err(|_| invalid()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let [year, month, day] = parts[..] else {
        return Err(invalid());
    };

    if !(1000..=9999).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }

    Ok(PurchaseDate::from_parts(year as u16, month as u8, day as u8))
}

/// Parse a purchase price. Any floating-point literal is accepted, negative included.
pub fn validate_price(text: &str) -> std::result::Result<f64, ValidationError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::Price(text.to_string()))
}

/// Parse a record identifier
pub fn parse_id(text: &str) -> std::result::Result<i64, ValidationError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::Id(text.to_string()))
}

/// Require non-blank text, returning it trimmed
pub fn require_text(field: Field, text: &str) -> std::result::Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Empty(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Outcome of looking up the user an asset should be assigned to
#[derive(Debug, Clone, PartialEq)]
pub enum UserResolution {
    /// The id parsed and the user exists
    Valid(User),
    /// The id parsed but no such user exists; the caller may create one and retry
    NotFound(i64),
    /// The text is not an id at all
    Malformed(ValidationError),
}

/// Resolve raw user-id text against the store
pub fn resolve_user(store: &InventoryStore, text: &str) -> Result<UserResolution> {
    let user_id = match parse_id(text) {
        Ok(id) => id,
        Err(e) => return Ok(UserResolution::Malformed(e)),
    };

    Ok(match store.find_user_by_id(user_id)? {
        Some(user) => UserResolution::Valid(user),
        None => UserResolution::NotFound(user_id),
    })
}

fn check<T>(
    failures: &mut Vec<FieldError>,
    field: Field,
    result: std::result::Result<T, ValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            failures.push(FieldError { field, error });
            None
        }
    }
}

/// Validate every field of an asset draft and confirm its user exists.
///
/// Malformed fields are all reported together as `Error::InvalidFields`.
/// A well-formed draft pointing at a missing user fails with
/// `ReferentialViolation::MissingUser`. Nothing is written either way.
pub fn check_asset_write(store: &InventoryStore, draft: &AssetDraft) -> Result<NewAsset> {
    let mut failures = Vec::new();

    let name = check(&mut failures, Field::Name, require_text(Field::Name, &draft.name));
    let category = check(&mut failures, Field::Category, require_text(Field::Category, &draft.category));
    let purchase_date = check(&mut failures, Field::PurchaseDate, validate_date(draft.purchase_date.trim()));
    let purchase_price = check(&mut failures, Field::PurchasePrice, validate_price(&draft.purchase_price));
    let user_id = check(&mut failures, Field::UserId, parse_id(&draft.user_id));

    let (Some(name), Some(category), Some(purchase_date), Some(purchase_price), Some(user_id)) =
        (name, category, purchase_date, purchase_price, user_id)
    else {
        warn!("Rejected asset draft: {}", describe_failures(&failures));
        return Err(Error::InvalidFields(failures));
    };

    if store.find_user_by_id(user_id)?.is_none() {
        warn!("Rejected asset draft: user {} does not exist", user_id);
        return Err(ReferentialViolation::MissingUser { user_id }.into());
    }

    Ok(NewAsset {
        name,
        category,
        purchase_date,
        purchase_price,
        status: draft.status.trim().to_string(),
        location: draft.location.trim().to_string(),
        user_id,
    })
}
