//! Member business logic - row access for household members.
//!
//! Every function is scoped to one owner and generic over `ConnectionTrait`, so the
//! ledger can run several of them inside a single database transaction.

use crate::{
    core::identity::UserId,
    entities::{Member, member},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};

/// Checks member input and returns the trimmed name.
///
/// Names must not be blank; earnings must be a finite, non-negative number.
pub fn validate_member(name: &str, earnings: f64) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            message: "Member name cannot be empty".to_string(),
        });
    }

    if !earnings.is_finite() || earnings < 0.0 {
        return Err(Error::InvalidAmount { amount: earnings });
    }

    Ok(trimmed)
}

/// Retrieves all members owned by `user_id`, in insertion order.
pub async fn list_members<C>(db: &C, user_id: UserId) -> Result<Vec<member::Model>>
where
    C: ConnectionTrait,
{
    Member::find()
        .filter(member::Column::UserId.eq(user_id))
        .order_by_asc(member::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds the first member with this name owned by `user_id`.
pub async fn find_member_by_name<C>(
    db: &C,
    user_id: UserId,
    name: &str,
) -> Result<Option<member::Model>>
where
    C: ConnectionTrait,
{
    Member::find()
        .filter(member::Column::UserId.eq(user_id))
        .filter(member::Column::Name.eq(name.trim()))
        .order_by_asc(member::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts a member. Does not check whether the name is already in use.
pub async fn create_member<C>(
    db: &C,
    user_id: UserId,
    name: &str,
    earning: bool,
    earnings: f64,
) -> Result<member::Model>
where
    C: ConnectionTrait,
{
    let name = validate_member(name, earnings)?;

    let member = member::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        earning: Set(earning),
        earnings: Set(earnings),
        ..Default::default()
    };

    member.insert(db).await.map_err(Into::into)
}

/// Updates earning status and amount on every member named `name`.
///
/// Returns the number of rows changed.
pub async fn update_members_by_name<C>(
    db: &C,
    user_id: UserId,
    name: &str,
    earning: bool,
    earnings: f64,
) -> Result<u64>
where
    C: ConnectionTrait,
{
    let name = validate_member(name, earnings)?;

    let result = Member::update_many()
        .col_expr(member::Column::Earning, Expr::value(earning))
        .col_expr(member::Column::Earnings, Expr::value(earnings))
        .filter(member::Column::UserId.eq(user_id))
        .filter(member::Column::Name.eq(name))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Deletes every member named `name`. Returns the number of rows removed.
pub async fn delete_members_by_name<C>(db: &C, user_id: UserId, name: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Member::delete_many()
        .filter(member::Column::UserId.eq(user_id))
        .filter(member::Column::Name.eq(name.trim()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
