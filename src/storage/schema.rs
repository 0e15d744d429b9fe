//! Database schema definitions

/// SQL to create the users table
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    department TEXT NOT NULL
)
"#;

/// SQL to create the assets table
/// The foreign key is declared only; `PRAGMA foreign_keys` stays off and
/// the link is checked before each write instead.
/// Price, status, location and user_id are nullable: SQLite stores a NaN
/// price as NULL, and older inventory files carry NULLs in all four.
pub const CREATE_ASSETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS assets (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    purchase_date TEXT NOT NULL,
    purchase_price REAL,
    status TEXT,
    location TEXT,
    user_id INTEGER,
    FOREIGN KEY (user_id) REFERENCES users(user_id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_assets_user_id ON assets(user_id)",
];

/// Tables that must exist for the store to count as initialized
pub const TABLE_NAMES: &[&str] = &["users", "assets"];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_USERS_TABLE, CREATE_ASSETS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
