//! Menu entity - A sellable dish or menu set with a base price.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menus")]
pub struct Model {
    /// Unique identifier for the menu
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Label shown to clients (e.g., "Beef Rendang")
    pub label: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Base price per unit
    pub price: f64,
    /// `"normal"` or `"menuset"`
    pub menutype: String,
    /// Path of the single stored image, if one was uploaded
    pub image_path: Option<String>,
    /// When the menu was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Menu and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One menu is offered in many weekmenus
    #[sea_orm(has_many = "super::weekmenu::Entity")]
    Weekmenus,
}

impl Related<super::weekmenu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Weekmenus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
