//! Database row types — these map directly to SQLite rows.
//! Distinct from career-types API models to keep the DB layer independent.

pub struct UserRow {
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: i64,
    pub username: String,
    pub report: String,
    pub created_at: String,
}

/// Result of an ownership-checked delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// No report with that id. Not an error: deletes are idempotent.
    Missing,
    /// The report belongs to someone else and was left in place.
    Forbidden,
}
