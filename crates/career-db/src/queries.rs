use crate::models::{DeleteOutcome, ReportRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

/// Report timestamps are local wall-clock time at second precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Database {
    // -- Users --

    /// Insert or overwrite the user row keyed by `username`.
    pub fn upsert_user(&self, username: &str, email: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)
                 ON CONFLICT(username) DO UPDATE SET email = excluded.email, password = excluded.password",
                (username, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, username))
    }

    /// Returns whether a row was updated. Unknown usernames change nothing.
    pub fn update_password(&self, username: &str, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password = ?2 WHERE username = ?1",
                (username, password_hash),
            )?;
            Ok(changed > 0)
        })
    }

    // -- Reports --

    pub fn insert_report(&self, username: &str, report: &str) -> Result<i64> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reports (username, report, timestamp) VALUES (?1, ?2, ?3)",
                (username, report, &timestamp),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All reports owned by `username`, newest id first.
    pub fn get_reports_for_user(&self, username: &str) -> Result<Vec<ReportRow>> {
        self.with_conn(|conn| query_reports_for_user(conn, username))
    }

    pub fn get_report(&self, id: i64) -> Result<Option<ReportRow>> {
        self.with_conn(|conn| query_report(conn, id))
    }

    /// Delete a report on behalf of `requester`. The ownership check and the
    /// delete run under the same connection lock.
    pub fn delete_report(&self, id: i64, requester: &str) -> Result<DeleteOutcome> {
        self.with_conn(|conn| {
            let owner: Option<String> = conn
                .query_row("SELECT username FROM reports WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;

            match owner {
                None => Ok(DeleteOutcome::Missing),
                Some(owner) if owner != requester => Ok(DeleteOutcome::Forbidden),
                Some(_) => {
                    conn.execute("DELETE FROM reports WHERE id = ?1", [id])?;
                    Ok(DeleteOutcome::Deleted)
                }
            }
        })
    }

    // -- Sessions --

    pub fn revoke_session(&self, jti: &str, expires_at: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO revoked_sessions (jti, expires_at) VALUES (?1, ?2)",
                rusqlite::params![jti, expires_at],
            )?;
            Ok(())
        })
    }

    pub fn is_session_revoked(&self, jti: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM revoked_sessions WHERE jti = ?1", [jti], |row| {
                    row.get::<_, i64>(0)
                })
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Drop revocations whose tokens have expired on their own.
    pub fn prune_revoked_sessions(&self, now: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM revoked_sessions WHERE expires_at < ?1", [now])?;
            Ok(removed)
        })
    }
}

fn query_user(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn
        .prepare("SELECT username, email, password, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                username: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_report(conn: &Connection, id: i64) -> Result<Option<ReportRow>> {
    let mut stmt =
        conn.prepare("SELECT id, username, report, timestamp FROM reports WHERE id = ?1")?;

    let row = stmt.query_row([id], map_report).optional()?;

    Ok(row)
}

fn query_reports_for_user(conn: &Connection, username: &str) -> Result<Vec<ReportRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, report, timestamp
         FROM reports
         WHERE username = ?1
         ORDER BY id DESC",
    )?;

    let rows = stmt
        .query_map([username], map_report)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_report(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportRow> {
    Ok(ReportRow {
        id: row.get(0)?,
        username: row.get(1)?,
        report: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
