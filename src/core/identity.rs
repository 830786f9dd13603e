//! Identity management - registration, login and credential updates.
//!
//! Passwords are stored as salted Argon2id PHC strings. Databases written by the
//! older tracker hold bare SHA-256 hex digests instead; those still verify, and a
//! successful login swaps them for an Argon2id hash.
//!
//! Expected outcomes are plain values rather than errors: a taken username is
//! `Ok(false)` and a failed login is `Ok(None)`. Unknown user and wrong password
//! look the same to the caller.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use sea_orm::{Set, SqlErr, prelude::*, sea_query::Expr};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

/// Primary key of a registered user.
pub type UserId = i64;

/// Length of a hex-encoded SHA-256 digest, the legacy hash format.
const LEGACY_DIGEST_LEN: usize = 64;

/// Checked against when the username is unknown, so every rejected login pays
/// for one Argon2id verification. Uses the default parameters.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$UoFS+OCsuZ7WzIy+cgVvSQ$AP2ww9+VYT9EV3CuziviDdnzh1acRMzHMEzTqIZB6dM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PasswordCheck {
    Mismatch,
    Valid,
    ValidLegacy,
}

/// Hashes a password into an Argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn legacy_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

fn is_legacy_hash(stored: &str) -> bool {
    stored.len() == LEGACY_DIGEST_LEN && stored.bytes().all(|b| b.is_ascii_hexdigit())
}

fn check_password(password: &str, stored: &str) -> Result<PasswordCheck> {
    if is_legacy_hash(stored) {
        // Keep legacy accounts as slow to reject as any other
        check_password(password, DUMMY_HASH)?;
        return Ok(if legacy_digest(password).eq_ignore_ascii_case(stored) {
            PasswordCheck::ValidLegacy
        } else {
            PasswordCheck::Mismatch
        });
    }

    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(PasswordCheck::Valid),
        Err(password_hash::Error::Password) => Ok(PasswordCheck::Mismatch),
        Err(e) => Err(e.into()),
    }
}

/// Verifies `password` against the stored hash, or against [`DUMMY_HASH`] when
/// there is no such user. A missing user is always a mismatch.
fn verify_login(password: &str, stored: Option<&str>) -> Result<PasswordCheck> {
    match stored {
        Some(stored) => check_password(password, stored),
        None => check_password(password, DUMMY_HASH).map(|_| PasswordCheck::Mismatch),
    }
}

fn validate_username(username: &str) -> Result<&str> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            message: "Username cannot be empty".to_string(),
        });
    }
    Ok(trimmed)
}

fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::Validation {
            message: "Password cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Registers a new user.
///
/// Returns `Ok(false)` when the username is already taken; the existing account
/// is left untouched.
#[instrument(skip(db, password))]
pub async fn register(db: &DatabaseConnection, username: &str, password: &str) -> Result<bool> {
    let username = validate_username(username)?;
    validate_password(password)?;

    let user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password)?),
        ..Default::default()
    };

    match user.insert(db).await {
        Ok(created) => {
            info!(user_id = created.id, "Registered new user");
            Ok(true)
        }
        Err(e) if is_unique_violation(&e) => {
            debug!("Username already taken");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks a username/password pair and returns the user's id on a match.
///
/// Unknown usernames still run a full Argon2id verification, so both kinds of
/// rejection take about as long.
///
/// # Errors
///
/// A stored hash that cannot be parsed is [`Error::PasswordHash`] rather than
/// `Ok(None)`. Storage failures are [`Error::Database`].
#[instrument(skip(db, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<UserId>> {
    let found = find_user_by_username(db, username.trim()).await?;
    let stored = found.as_ref().map(|u| u.password_hash.as_str());

    match (verify_login(password, stored)?, found) {
        (PasswordCheck::Valid, Some(found)) => Ok(Some(found.id)),
        (PasswordCheck::ValidLegacy, Some(found)) => {
            upgrade_legacy_hash(db, &found, password).await?;
            Ok(Some(found.id))
        }
        _ => {
            debug!("Login rejected");
            Ok(None)
        }
    }
}

/// Replaces an unsalted legacy digest, but only if nobody changed it meanwhile.
async fn upgrade_legacy_hash(
    db: &DatabaseConnection,
    found: &user::Model,
    password: &str,
) -> Result<()> {
    let upgraded = User::update_many()
        .col_expr(user::Column::PasswordHash, Expr::value(hash_password(password)?))
        .filter(user::Column::Id.eq(found.id))
        .filter(user::Column::PasswordHash.eq(found.password_hash.as_str()))
        .exec(db)
        .await?;

    if upgraded.rows_affected == 1 {
        info!(user_id = found.id, "Upgraded legacy password hash");
    } else {
        warn!(user_id = found.id, "Legacy password hash changed during upgrade");
    }
    Ok(())
}

/// Renames a user. Returns `Ok(false)` when the new name belongs to someone else.
#[instrument(skip(db))]
pub async fn update_username(
    db: &DatabaseConnection,
    user_id: UserId,
    new_username: &str,
) -> Result<bool> {
    let new_username = validate_username(new_username)?;
    let existing = find_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    if existing.username == new_username {
        return Ok(true);
    }

    let mut active: user::ActiveModel = existing.into();
    active.username = Set(new_username.to_string());
    match active.update(db).await {
        Ok(_) => {
            info!(user_id, "Username updated");
            Ok(true)
        }
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Sets a new password for an existing user.
#[instrument(skip(db, new_password))]
pub async fn update_password(
    db: &DatabaseConnection,
    user_id: UserId,
    new_password: &str,
) -> Result<bool> {
    validate_password(new_password)?;

    let result = User::update_many()
        .col_expr(user::Column::PasswordHash, Expr::value(hash_password(new_password)?))
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::UserNotFound { id: user_id });
    }
    info!(user_id, "Password updated");
    Ok(true)
}

/// Finds a user by primary key.
pub async fn find_user_by_id(
    db: &DatabaseConnection,
    user_id: UserId,
) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by exact username.
pub async fn find_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_register_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = register(&db, "   ", "secret").await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        let result = register(&db, "alice", "").await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_and_authenticate() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(register(&db, "alice", "secret").await?);
        let user_id = authenticate(&db, "alice", "secret").await?;
        assert!(user_id.is_some());

        // Stored hash is a salted PHC string, not the password
        let stored = find_user_by_id(&db, user_id.unwrap()).await?.unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));
        assert!(!stored.password_hash.contains("secret"));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_username() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(register(&db, "alice", "first").await?);
        assert!(!register(&db, "alice", "second").await?);

        // First account's password remains valid, the second never took
        assert!(authenticate(&db, "alice", "first").await?.is_some());
        assert!(authenticate(&db, "alice", "second").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() -> Result<()> {
        let db = setup_test_db().await?;
        register(&db, "alice", "secret").await?;

        assert_eq!(authenticate(&db, "alice", "wrong").await?, None);
        assert_eq!(authenticate(&db, "bob", "secret").await?, None);
        assert_eq!(authenticate(&db, "alice", "").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_same_password_gets_different_salts() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = register_test_user(&db, "alice").await?;
        let bob = register_test_user(&db, "bob").await?;

        let alice_hash = find_user_by_id(&db, alice).await?.unwrap().password_hash;
        let bob_hash = find_user_by_id(&db, bob).await?.unwrap().password_hash;
        assert_ne!(alice_hash, bob_hash);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_username() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = register_test_user(&db, "alice").await?;
        register_test_user(&db, "bob").await?;

        // Conflict with another user
        assert!(!update_username(&db, alice, "bob").await?);
        assert!(authenticate(&db, "alice", TEST_PASSWORD).await?.is_some());

        // Renaming to the current name is a no-op success
        assert!(update_username(&db, alice, "alice").await?);

        assert!(update_username(&db, alice, "alicia").await?);
        assert_eq!(authenticate(&db, "alicia", TEST_PASSWORD).await?, Some(alice));
        assert!(authenticate(&db, "alice", TEST_PASSWORD).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_username_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;

        let result = update_username(&db, 999, "ghost").await;
        assert!(matches!(result, Err(Error::UserNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_password() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = register_test_user(&db, "alice").await?;

        assert!(update_password(&db, alice, "new-secret").await?);
        assert!(authenticate(&db, "alice", TEST_PASSWORD).await?.is_none());
        assert_eq!(authenticate(&db, "alice", "new-secret").await?, Some(alice));

        let result = update_password(&db, 999, "whatever").await;
        assert!(matches!(result, Err(Error::UserNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_legacy_hash_login_upgrades_hash() -> Result<()> {
        let db = setup_test_db().await?;

        // Account as the old tracker stored it: unsalted SHA-256 hex
        let legacy = user::ActiveModel {
            username: Set("carol".to_string()),
            password_hash: Set(legacy_digest("hunter2")),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        assert_eq!(
            legacy.password_hash,
            "f52fbd32b2b3b86ff88ef6c490628285f482af15ddcb29541f94bcf526a3f6c7"
        );

        assert!(authenticate(&db, "carol", "hunter1").await?.is_none());
        assert_eq!(authenticate(&db, "carol", "hunter2").await?, Some(legacy.id));

        let upgraded = find_user_by_id(&db, legacy.id).await?.unwrap();
        assert!(upgraded.password_hash.starts_with("$argon2id$"));
        assert_eq!(authenticate(&db, "carol", "hunter2").await?, Some(legacy.id));

        Ok(())
    }

    #[test]
    fn test_is_legacy_hash() {
        assert!(is_legacy_hash(&legacy_digest("anything")));
        assert!(!is_legacy_hash("$argon2id$v=19$m=19456,t=2,p=1$abc$def"));
        assert!(!is_legacy_hash("not-a-digest"));
    }

    #[test]
    fn test_unknown_user_is_verified_against_dummy_hash() {
        let dummy = PasswordHash::new(DUMMY_HASH).unwrap();
        let fresh_hash = hash_password("secret").unwrap();
        let fresh = PasswordHash::new(&fresh_hash).unwrap();

        // Same algorithm and cost as a real account
        assert_eq!(dummy.algorithm, fresh.algorithm);
        assert_eq!(dummy.params.to_string(), fresh.params.to_string());

        assert_eq!(verify_login("secret", None).unwrap(), PasswordCheck::Mismatch);
        assert_eq!(verify_login("", None).unwrap(), PasswordCheck::Mismatch);
        assert_eq!(
            verify_login("secret", Some(&fresh_hash)).unwrap(),
            PasswordCheck::Valid
        );
    }

    #[test]
    fn test_corrupt_stored_hash_is_an_error() {
        let result = check_password("secret", "garbage");
        assert!(matches!(result, Err(Error::PasswordHash { message: _ })));
    }
}
