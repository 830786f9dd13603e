//! Unified error types and result handling.

use thiserror::Error;

/// Every failure the ledger can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The underlying store failed (disk, permissions, corruption, bad SQL)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure outside the store itself
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable was missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Rejected input such as an empty name
    #[error("Invalid input: {message}")]
    Validation {
        /// What was rejected
        message: String,
    },

    /// Negative, NaN or infinite money value
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// No user with this id exists
    #[error("User not found: {id}")]
    UserNotFound {
        /// The missing user id
        id: i64,
    },

    /// No member with this name belongs to the user
    #[error("Member not found: {name}")]
    MemberNotFound {
        /// The missing member name
        name: String,
    },

    /// No expense with this id belongs to the user
    #[error("Expense not found: {id}")]
    ExpenseNotFound {
        /// The missing expense id
        id: i64,
    },

    /// Positional delete outside the current expense list
    #[error("Expense index {index} is out of range for {len} expenses")]
    ExpenseIndexOutOfRange {
        /// Requested position
        index: usize,
        /// Length of the list at the time of the request
        len: usize,
    },

    /// Hashing or parsing a stored hash failed
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Message from the hasher
        message: String,
    },
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
