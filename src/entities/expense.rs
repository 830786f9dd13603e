//! Expense entity - A single spend record.
//!
//! `member` holds the member's name rather than a key, so deleting a member
//! leaves their expenses in place. `date` is stored as `YYYY-MM-DD` text,
//! which keeps it sortable and lets the monthly summary slice the month out.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the user who owns this expense
    pub user_id: i64,
    /// Name of the member the expense is attributed to
    pub member: String,
    /// Amount spent
    pub value: f64,
    /// Spending category, free text (see `core::category` for the usual set)
    pub category: String,
    /// Optional note
    pub description: Option<String>,
    /// Day the money was spent
    pub date: Date,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
