//! Ledger - one user's members and expenses, kept in memory and in the store.
//!
//! A [`Ledger`] is loaded once per session. Every mutation writes to the store
//! first and only touches the in-memory lists after the write succeeded, so the
//! two never drift apart. Aggregates over members and expenses are computed from
//! memory, except [`Ledger::monthly_summary`], which asks the store.

use crate::{
    core::{
        expense::{self as expense_store, NewExpense},
        identity::UserId,
        member as member_store,
        summary::{self, BudgetInsight, CategoryShare, CategoryTotal, MonthlyTotal},
    },
    entities::{expense, member},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Outcome of [`Ledger::upsert_member`].
#[derive(Debug, Clone, PartialEq)]
pub enum MemberUpsert {
    /// No member had this name; a new one was stored
    Created(member::Model),
    /// An existing member was updated; holds its new state
    Updated(member::Model),
}

impl MemberUpsert {
    /// The member as it is now stored.
    #[must_use]
    pub const fn member(&self) -> &member::Model {
        match self {
            Self::Created(member) | Self::Updated(member) => member,
        }
    }
}

/// Per-user view of members and expenses, backed by the store.
///
/// The connection is shared, so a [`Session`](crate::core::session::Session)
/// and its ledger write through the same pool.
#[derive(Debug)]
pub struct Ledger {
    db: Arc<DatabaseConnection>,
    user_id: UserId,
    members: Vec<member::Model>,
    expenses: Vec<expense::Model>,
}

impl Ledger {
    /// Loads every member and expense belonging to `user_id`.
    #[instrument(skip(db))]
    pub async fn load(db: &Arc<DatabaseConnection>, user_id: UserId) -> Result<Self> {
        let members = member_store::list_members(db.as_ref(), user_id).await?;
        let expenses = expense_store::list_expenses(db.as_ref(), user_id).await?;
        debug!(
            members = members.len(),
            expenses = expenses.len(),
            "Ledger loaded"
        );

        Ok(Self {
            db: Arc::clone(db),
            user_id,
            members,
            expenses,
        })
    }

    /// Discards the in-memory lists and reads them again from the store.
    pub async fn reload(&mut self) -> Result<()> {
        self.members = member_store::list_members(self.conn(), self.user_id).await?;
        self.expenses = expense_store::list_expenses(self.conn(), self.user_id).await?;
        Ok(())
    }

    fn conn(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Owner of this ledger.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[member::Model] {
        &self.members
    }

    /// Expenses in insertion order.
    #[must_use]
    pub fn expenses(&self) -> &[expense::Model] {
        &self.expenses
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn find_member(&self, name: &str) -> Option<&member::Model> {
        let name = name.trim();
        self.members.iter().find(|m| m.name == name)
    }

    /// Adds a member without checking for an existing one of the same name.
    ///
    /// Prefer [`Ledger::upsert_member`] when the name may already be taken.
    pub async fn add_member(
        &mut self,
        name: &str,
        earning: bool,
        earnings: f64,
    ) -> Result<member::Model> {
        let created =
            member_store::create_member(self.conn(), self.user_id, name, earning, earnings).await?;
        self.members.push(created.clone());
        Ok(created)
    }

    /// Updates earning status and amount of the member(s) called `name`.
    pub async fn update_member(&mut self, name: &str, earning: bool, earnings: f64) -> Result<()> {
        let updated =
            member_store::update_members_by_name(self.conn(), self.user_id, name, earning, earnings)
                .await?;
        if updated == 0 {
            return Err(Error::MemberNotFound {
                name: name.trim().to_string(),
            });
        }

        self.apply_member_update(name.trim(), earning, earnings);
        Ok(())
    }

    /// Creates the member, or updates it if one with this name already exists.
    ///
    /// The lookup and the write share one database transaction.
    #[instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn upsert_member(
        &mut self,
        name: &str,
        earning: bool,
        earnings: f64,
    ) -> Result<MemberUpsert> {
        let name = member_store::validate_member(name, earnings)?;

        let txn = self.conn().begin().await?;
        let outcome = match member_store::find_member_by_name(&txn, self.user_id, name).await? {
            Some(existing) => {
                member_store::update_members_by_name(&txn, self.user_id, name, earning, earnings)
                    .await?;
                MemberUpsert::Updated(member::Model {
                    earning,
                    earnings,
                    ..existing
                })
            }
            None => MemberUpsert::Created(
                member_store::create_member(&txn, self.user_id, name, earning, earnings).await?,
            ),
        };
        txn.commit().await?;

        match &outcome {
            MemberUpsert::Created(created) => self.members.push(created.clone()),
            MemberUpsert::Updated(_) => self.apply_member_update(name, earning, earnings),
        }
        info!(
            member = name,
            created = matches!(outcome, MemberUpsert::Created(_)),
            "Member saved"
        );
        Ok(outcome)
    }

    fn apply_member_update(&mut self, name: &str, earning: bool, earnings: f64) {
        for member in self.members.iter_mut().filter(|m| m.name == name) {
            member.earning = earning;
            member.earnings = earnings;
        }
    }

    /// Removes the member(s) called `name`. Their expenses are kept.
    pub async fn delete_member(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        let removed = member_store::delete_members_by_name(self.conn(), self.user_id, name).await?;
        if removed == 0 {
            return Err(Error::MemberNotFound {
                name: name.to_string(),
            });
        }

        self.members.retain(|m| m.name != name);
        Ok(())
    }

    /// Records an expense. The member name is not checked against the members list.
    pub async fn add_expense(
        &mut self,
        member: &str,
        value: f64,
        category: &str,
        description: Option<&str>,
        date: NaiveDate,
    ) -> Result<expense::Model> {
        let created = expense_store::create_expense(
            self.conn(),
            self.user_id,
            NewExpense {
                member,
                value,
                category,
                description,
                date,
            },
        )
        .await?;
        self.expenses.push(created.clone());
        Ok(created)
    }

    /// Deletes an expense by its id.
    pub async fn delete_expense(&mut self, expense_id: i64) -> Result<()> {
        expense_store::delete_expense(self.conn(), self.user_id, expense_id).await?;
        self.expenses.retain(|e| e.id != expense_id);
        Ok(())
    }

    /// Deletes the expense at `index` in [`Ledger::expenses`] and returns it.
    ///
    /// An index past the end is reported and nothing is deleted.
    pub async fn delete_expense_at(&mut self, index: usize) -> Result<expense::Model> {
        let Some(expense_id) = self.expenses.get(index).map(|e| e.id) else {
            return Err(Error::ExpenseIndexOutOfRange {
                index,
                len: self.expenses.len(),
            });
        };

        expense_store::delete_expense(self.conn(), self.user_id, expense_id).await?;
        Ok(self.expenses.remove(index))
    }

    /// Sum of earnings over members marked as earning.
    #[must_use]
    pub fn total_earnings(&self) -> f64 {
        self.members
            .iter()
            .filter(|m| m.earning)
            .map(|m| m.earnings)
            .sum()
    }

    /// Sum of all expense values.
    #[must_use]
    pub fn total_expenditure(&self) -> f64 {
        self.expenses.iter().map(|e| e.value).sum()
    }

    /// Earnings left after expenses; negative when overspent.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        self.total_earnings() - self.total_expenditure()
    }

    /// Spending per `YYYY-MM`, oldest first, read fresh from the store.
    pub async fn monthly_summary(&self) -> Result<Vec<MonthlyTotal>> {
        expense_store::monthly_totals(self.conn(), self.user_id).await
    }

    /// Spending per category, largest first.
    #[must_use]
    pub fn category_breakdown(&self) -> Vec<CategoryTotal> {
        summary::category_breakdown(&self.expenses)
    }

    /// Each category's percentage of total spending.
    #[must_use]
    pub fn expense_distribution(&self) -> Vec<CategoryShare> {
        summary::expense_distribution(&self.expenses)
    }

    /// Latest month against the monthly average, plus the top category.
    pub async fn budget_insight(&self) -> Result<Option<BudgetInsight>> {
        let monthly = self.monthly_summary().await?;
        Ok(summary::budget_insight(&monthly, &self.category_breakdown()))
    }
}
