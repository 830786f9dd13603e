//! Member entity - A person in the household.
//!
//! Members are identified by name within their owner's ledger. The table itself
//! does not enforce `(user_id, name)` uniqueness.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Member database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Unique identifier for the member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the user who owns this member
    pub user_id: i64,
    /// Display name (e.g., "Alice")
    pub name: String,
    /// Whether this member currently earns
    pub earning: bool,
    /// Earnings amount; only counted when `earning` is true
    pub earnings: f64,
}

/// Defines relationships between Member and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each member belongs to one user
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
