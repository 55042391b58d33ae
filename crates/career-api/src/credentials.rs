//! Credential store: username → (email, password hash).
//!
//! Passwords are hashed with Argon2id and a random per-password salt. The
//! PHC string (algorithm, parameters, salt, digest) is what gets stored.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::{info, warn};

use career_db::Database;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub email: String,
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Create the user, or overwrite the existing record with the same username.
pub fn register(db: &Database, username: &str, email: &str, password: &str) -> Result<()> {
    let hash = hash_password(password)?;
    db.upsert_user(username, email, &hash)?;
    info!("Registered user {}", username);
    Ok(())
}

/// Returns the user when `password` verifies against the stored hash.
pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<Option<User>> {
    let Some(row) = db.get_user(username)? else {
        return Ok(None);
    };

    let parsed = match PasswordHash::new(&row.password) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored hash for {} is unreadable: {}", username, e);
            return Ok(None);
        }
    };

    if Argon2::default().verify_password(password.as_bytes(), &parsed).is_err() {
        return Ok(None);
    }

    Ok(Some(User {
        username: row.username,
        email: row.email,
    }))
}

/// Overwrite the password for `username` without checking the old one.
/// Unknown usernames are left alone and still count as success.
pub fn reset_password(db: &Database, username: &str, new_password: &str) -> Result<()> {
    let hash = hash_password(new_password)?;
    if db.update_password(username, &hash)? {
        info!("Password reset for {}", username);
    } else {
        info!("Password reset requested for unknown user {}", username);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn register_then_authenticate() {
        let db = db();
        register(&db, "alice", "a@x.com", "pw1").unwrap();

        let user = authenticate(&db, "alice", "pw1").unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.com");

        assert!(authenticate(&db, "alice", "wrong").unwrap().is_none());
        assert!(authenticate(&db, "nobody", "pw1").unwrap().is_none());
    }

    #[test]
    fn reregistration_replaces_password() {
        let db = db();
        register(&db, "alice", "a@x.com", "first").unwrap();
        register(&db, "alice", "a@x.com", "second").unwrap();

        assert!(authenticate(&db, "alice", "first").unwrap().is_none());
        assert!(authenticate(&db, "alice", "second").unwrap().is_some());
    }

    #[test]
    fn stored_hash_is_salted() {
        let db = db();
        register(&db, "alice", "a@x.com", "same").unwrap();
        register(&db, "bob", "b@x.com", "same").unwrap();

        let a = db.get_user("alice").unwrap().unwrap().password;
        let b = db.get_user("bob").unwrap().unwrap().password;
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(!a.contains("same"));
    }

    #[test]
    fn reset_password_needs_no_old_password() {
        let db = db();
        register(&db, "alice", "a@x.com", "old").unwrap();
        reset_password(&db, "alice", "new").unwrap();

        assert!(authenticate(&db, "alice", "old").unwrap().is_none());
        assert!(authenticate(&db, "alice", "new").unwrap().is_some());
    }

    #[test]
    fn reset_password_for_unknown_user_is_silent_noop() {
        let db = db();
        reset_password(&db, "ghost", "pw").unwrap();

        assert!(db.get_user("ghost").unwrap().is_none());
        assert!(authenticate(&db, "ghost", "pw").unwrap().is_none());
    }

    #[test]
    fn corrupt_hash_does_not_authenticate() {
        let db = db();
        db.upsert_user("legacy", "l@x.com", "5e884898da28047151d0e56f8dc62927").unwrap();
        assert!(authenticate(&db, "legacy", "password").unwrap().is_none());
    }
}
