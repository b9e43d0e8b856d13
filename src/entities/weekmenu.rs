//! Weekmenu entity - A menu offered in a specific (week, year) bucket.
//!
//! `quantity` is the remaining orderable stock, decremented as orders are placed.
//! `ordering` is the manual display rank within the bucket and `invitation`
//! marks a future bucket as visible for pre-order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Weekmenu database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weekmenus")]
pub struct Model {
    /// Unique identifier for the weekmenu
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Menu being offered
    pub menu_id: i64,
    /// ISO week number (1-53)
    pub week: i32,
    /// ISO week-based year
    pub year: i32,
    /// Delivery group, None for a global offering
    pub group_id: Option<i64>,
    /// Remaining units that can still be ordered
    pub quantity: i32,
    /// Display rank within the (week, year) bucket
    pub ordering: i32,
    /// Visible for pre-order while the bucket lies in the future
    pub invitation: bool,
    /// When the weekmenu was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Weekmenu and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each weekmenu offers one menu
    #[sea_orm(
        belongs_to = "super::menu::Entity",
        from = "Column::MenuId",
        to = "super::menu::Column::Id",
        on_delete = "Cascade"
    )]
    Menu,
    /// Each weekmenu optionally belongs to one group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "SetNull"
    )]
    Group,
    /// One weekmenu has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menu.def()
    }
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

impl ActiveModelBehavior for ActiveModel {}
