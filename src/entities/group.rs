//! Group entity - A named delivery region.
//!
//! Users and weekmenus optionally belong to one group. A weekmenu without a group
//! is global and visible to every client.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Group database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    /// Unique identifier for the group
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Amsterdam Noord")
    pub name: String,
    /// Unique short identifier used in commands and configuration
    #[sea_orm(unique)]
    pub slug: String,
    /// Inactive groups are hidden from selection lists
    pub active: bool,
    /// When the group was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Group and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One group has many users
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
    /// One group has many weekmenus
    #[sea_orm(has_many = "super::weekmenu::Entity")]
    Weekmenus,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::weekmenu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Weekmenus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
