//! Expense business logic - row access and monthly aggregation for expenses.
//!
//! Expenses are addressed by primary key and always filtered by owner, so one
//! user's ids can never reach another user's rows.

use crate::{
    core::{identity::UserId, summary::MonthlyTotal},
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};

/// `YYYY-MM` prefix of the stored `YYYY-MM-DD` date.
const MONTH_EXPR: &str = r#"substr("date", 1, 7)"#;

/// Fields of an expense that is about to be stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpense<'a> {
    /// Member the expense is attributed to
    pub member: &'a str,
    /// Amount spent
    pub value: f64,
    /// Spending category
    pub category: &'a str,
    /// Optional note; blank notes are stored as NULL
    pub description: Option<&'a str>,
    /// Day of the expense
    pub date: NaiveDate,
}

/// Retrieves all expenses owned by `user_id`, in insertion order.
pub async fn list_expenses<C>(db: &C, user_id: UserId) -> Result<Vec<expense::Model>>
where
    C: ConnectionTrait,
{
    Expense::find()
        .filter(expense::Column::UserId.eq(user_id))
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts an expense. The member name is stored as given, unchecked.
pub async fn create_expense<C>(
    db: &C,
    user_id: UserId,
    new_expense: NewExpense<'_>,
) -> Result<expense::Model>
where
    C: ConnectionTrait,
{
    let NewExpense {
        member,
        value,
        category,
        description,
        date,
    } = new_expense;

    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidAmount { amount: value });
    }

    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(ToString::to_string);

    let expense = expense::ActiveModel {
        user_id: Set(user_id),
        member: Set(member.to_string()),
        value: Set(value),
        category: Set(category.to_string()),
        description: Set(description),
        date: Set(date),
        ..Default::default()
    };

    expense.insert(db).await.map_err(Into::into)
}

/// Deletes one expense by id, provided it belongs to `user_id`.
pub async fn delete_expense<C>(db: &C, user_id: UserId, expense_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Expense::delete_many()
        .filter(expense::Column::Id.eq(expense_id))
        .filter(expense::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ExpenseNotFound { id: expense_id });
    }
    Ok(())
}

/// Sums a user's expenses per calendar month, oldest month first.
pub async fn monthly_totals<C>(db: &C, user_id: UserId) -> Result<Vec<MonthlyTotal>>
where
    C: ConnectionTrait,
{
    Expense::find()
        .select_only()
        .column_as(Expr::cust(MONTH_EXPR), "month")
        .column_as(expense::Column::Value.sum(), "total")
        .filter(expense::Column::UserId.eq(user_id))
        .group_by(Expr::cust(MONTH_EXPR))
        .order_by_asc(Expr::cust(MONTH_EXPR))
        .into_model::<MonthlyTotal>()
        .all(db)
        .await
        .map_err(Into::into)
}
