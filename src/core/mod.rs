//! Core business logic - framework-agnostic identity, ledger and summary operations.
//!
//! Nothing in here knows about forms or charts. The presentation layer logs a
//! user in through [`session::Session`] and drives the [`ledger::Ledger`] it holds.

/// Standard expense categories
pub mod category;
/// Expense rows and monthly aggregation
pub mod expense;
/// Registration, login and credential updates
pub mod identity;
/// Per-user in-memory view of members and expenses
pub mod ledger;
/// Household member rows
pub mod member;
/// Explicit per-login context
pub mod session;
/// Pure aggregation over expenses
pub mod summary;
