//! Order entity - A client's request for N units of a weekmenu in a given week.
//!
//! Rows are unique per (`user_id`, `weekmenu_id`, `week`, `year`); repeated placements
//! merge into the existing row instead of inserting a new one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Client who placed the order
    pub user_id: i64,
    /// Weekmenu being ordered
    pub weekmenu_id: i64,
    /// Delivery group, inherited from the user or else the weekmenu
    pub group_id: Option<i64>,
    /// Week the order is for
    pub week: i32,
    /// Year the order is for
    pub year: i32,
    /// Units ordered
    pub quantity: i32,
    /// Per-unit price override set by an admin
    pub special_price: Option<f64>,
    /// Free-text notes from the client
    pub notes: Option<String>,
    /// When the order was first placed
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each order is for one weekmenu
    #[sea_orm(
        belongs_to = "super::weekmenu::Entity",
        from = "Column::WeekmenuId",
        to = "super::weekmenu::Column::Id",
        on_delete = "Cascade"
    )]
    Weekmenu,
    /// One order can appear on many invoice items
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    InvoiceItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::weekmenu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Weekmenu.def()
    }
}

impl Related<super::invoice_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
