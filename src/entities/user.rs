//! User entity - Admins and clients of the ordering system.
//!
//! The `username` doubles as the e-mail address. `discord_id` binds the row to
//! the Discord account that issues commands on its behalf.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login name, always an e-mail address
    #[sea_orm(unique)]
    pub username: String,
    /// Optional phone number
    pub phone: Option<String>,
    /// Delivery group, if any
    pub group_id: Option<i64>,
    /// `"admin"` or `"client"`
    pub role: String,
    /// Inactive users cannot order
    pub active: bool,
    /// Discord user ID bound to this account
    #[sea_orm(unique)]
    pub discord_id: Option<String>,
    /// When the user was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// The e-mail address of the user (the username).
    #[must_use]
    pub fn email(&self) -> &str {
        &self.username
    }
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each user optionally belongs to one group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "SetNull"
    )]
    Group,
    /// One user has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    /// One user has many invoices
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
