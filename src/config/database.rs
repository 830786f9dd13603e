//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Creation uses `IF NOT EXISTS`,
//! which makes [`create_tables`] safe to run on every start.
//!
//! Databases written by the older tracker name the password column `password`.
//! [`create_tables`] renames it to `password_hash` so those accounts can log in.

use crate::entities::{Expense, Member, User};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait,
    Schema, Statement,
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default location of the ledger database, created on first connect.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/household_ledger.sqlite?mode=rwc";

/// Row counts per table, logged at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCounts {
    /// Rows in `users`
    pub users: u64,
    /// Rows in `members`
    pub members: u64,
    /// Rows in `expenses`
    pub expenses: u64,
}

/// Returns the filesystem path of a file-backed `SQLite` URL, or `None` for
/// in-memory databases and non-sqlite URLs.
#[must_use]
pub fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

/// Establishes a connection to the `SQLite` database at `database_url`.
///
/// For file-backed databases the parent directory is created first, so a fresh
/// checkout can start without any manual setup.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url)
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
    {
        debug!("Ensuring database directory {:?} exists", parent);
        std::fs::create_dir_all(parent)?;
    }

    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the `users`, `members` and `expenses` tables if they are missing.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Users first, the other two reference it
    let user_table = schema.create_table_from_entity(User).if_not_exists().to_owned();
    let member_table = schema
        .create_table_from_entity(Member)
        .if_not_exists()
        .to_owned();
    let expense_table = schema
        .create_table_from_entity(Expense)
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&user_table)).await?;
    migrate_legacy_users(db).await?;
    db.execute(builder.build(&member_table)).await?;
    db.execute(builder.build(&expense_table)).await?;

    info!("Database tables ensured.");
    Ok(())
}

/// Column names of the `users` table, as `SQLite` reports them.
async fn user_columns(db: &DatabaseConnection) -> Result<Vec<String>> {
    let rows = db
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            "PRAGMA table_info(users)",
        ))
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String>("", "name").map_err(Into::into))
        .collect()
}

/// Renames `users.password` to `password_hash` on a database from the older tracker.
///
/// The stored SHA-256 digests are kept as they are; identity upgrades them on login.
#[instrument(skip(db))]
async fn migrate_legacy_users(db: &DatabaseConnection) -> Result<()> {
    if db.get_database_backend() != DbBackend::Sqlite {
        return Ok(());
    }

    let columns = user_columns(db).await?;
    let has_column = |name: &str| columns.iter().any(|c| c == name);
    if has_column("password") && !has_column("password_hash") {
        db.execute_unprepared("ALTER TABLE users RENAME COLUMN password TO password_hash")
            .await?;
        info!("Renamed legacy users.password column to password_hash");
    }
    Ok(())
}

/// Counts the rows in every table.
pub async fn count_rows(db: &DatabaseConnection) -> Result<TableCounts> {
    Ok(TableCounts {
        users: User::find().count(db).await?,
        members: Member::find().count(db).await?,
        expenses: Expense::find().count(db).await?,
    })
}
