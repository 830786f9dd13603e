//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test users, ledgers and expenses with sensible defaults.
#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        category::ExpenseCategory,
        expense::{self, NewExpense},
        identity::{self, UserId},
        ledger::Ledger,
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Password every test user is registered with.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a user with [`TEST_PASSWORD`] and returns their id.
pub async fn register_test_user(db: &DatabaseConnection, username: &str) -> Result<UserId> {
    assert!(identity::register(db, username, TEST_PASSWORD).await?);
    Ok(identity::find_user_by_username(db, username)
        .await?
        .unwrap()
        .id)
}

/// Sets up a database with one registered user and that user's empty ledger.
pub async fn setup_with_ledger() -> Result<(Arc<DatabaseConnection>, Ledger)> {
    let db = Arc::new(setup_test_db().await?);
    let user_id = register_test_user(&db, "test_user").await?;
    let ledger = Ledger::load(&db, user_id).await?;
    Ok((db, ledger))
}

/// Parses a `YYYY-MM-DD` date.
pub fn test_date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
}

/// Adds a "Food" expense through the ledger.
pub async fn add_test_expense(
    ledger: &mut Ledger,
    member: &str,
    value: f64,
    date: &str,
) -> Result<entities::expense::Model> {
    ledger
        .add_expense(
            member,
            value,
            ExpenseCategory::Food.as_str(),
            Some("Test expense"),
            test_date(date),
        )
        .await
}

/// Stores a "Food" expense directly, bypassing any ledger.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    user_id: UserId,
    value: f64,
    date: &str,
) -> Result<entities::expense::Model> {
    expense::create_expense(
        db,
        user_id,
        NewExpense {
            member: "Test Member",
            value,
            category: ExpenseCategory::Food.as_str(),
            description: None,
            date: test_date(date),
        },
    )
    .await
}

/// Builds an expense row in memory, for the pure summary functions.
pub fn expense_row(id: i64, value: f64, category: &str, date: &str) -> entities::expense::Model {
    entities::expense::Model {
        id,
        user_id: 1,
        member: "Test Member".to_string(),
        value,
        category: category.to_string(),
        description: None,
        date: test_date(date),
    }
}
