//! User entity - An account that owns members and expenses.
//!
//! Usernames are unique. The stored hash is either an Argon2id PHC string or,
//! for accounts carried over from older databases, a bare SHA-256 hex digest.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across the store
    #[sea_orm(unique)]
    pub username: String,
    /// Password hash, never serialized out
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many household members
    #[sea_orm(has_many = "super::member::Entity")]
    Members,
    /// One user has many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
