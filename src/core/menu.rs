//! Menu business logic - The catalog of dishes and menu sets that weekmenus offer.

use crate::{
    entities::{Menu, menu},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use std::{fmt, str::FromStr};
use tracing::{info, instrument};

const MAX_LABEL_LEN: usize = 255;

/// Kind of menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuType {
    /// A single dish
    Normal,
    /// A set of dishes sold as one
    Menuset,
}

impl MenuType {
    /// All menu types, for choice lists.
    pub const ALL: [Self; 2] = [Self::Normal, Self::Menuset];

    /// The stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Menuset => "menuset",
        }
    }
}

impl fmt::Display for MenuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "menuset" => Ok(Self::Menuset),
            other => Err(Error::Validation {
                field: "menutype",
                message: format!("must be 'normal' or 'menuset', got '{other}'"),
            }),
        }
    }
}

fn validate_menu(label: &str, price: f64) -> Result<String> {
    let label = label.trim();
    if label.is_empty() || label.chars().count() > MAX_LABEL_LEN {
        return Err(Error::Validation {
            field: "label",
            message: format!("must be between 1 and {MAX_LABEL_LEN} characters"),
        });
    }
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(label.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Finds a menu by its unique ID.
pub async fn get_menu_by_id(db: &DatabaseConnection, menu_id: i64) -> Result<Option<menu::Model>> {
    Menu::find_by_id(menu_id).one(db).await.map_err(Into::into)
}

/// Creates a menu.
#[instrument(skip(db))]
pub async fn create_menu(
    db: &DatabaseConnection,
    label: String,
    description: Option<String>,
    price: f64,
    menutype: MenuType,
) -> Result<menu::Model> {
    let label = validate_menu(&label, price)?;

    let menu = menu::ActiveModel {
        label: Set(label),
        description: Set(normalize_description(description)),
        price: Set(price),
        menutype: Set(menutype.as_str().to_string()),
        image_path: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = menu.insert(db).await?;
    info!("Created menu '{}' at {:.2}", created.label, created.price);
    Ok(created)
}

/// Replaces label, description, price and type of a menu. The image is kept.
#[instrument(skip(db))]
pub async fn update_menu(
    db: &DatabaseConnection,
    menu_id: i64,
    label: String,
    description: Option<String>,
    price: f64,
    menutype: MenuType,
) -> Result<menu::Model> {
    let label = validate_menu(&label, price)?;

    let mut menu: menu::ActiveModel = get_menu_by_id(db, menu_id)
        .await?
        .ok_or(Error::MenuNotFound { id: menu_id })?
        .into();

    menu.label = Set(label);
    menu.description = Set(normalize_description(description));
    menu.price = Set(price);
    menu.menutype = Set(menutype.as_str().to_string());
    menu.update(db).await.map_err(Into::into)
}

/// Deletes a menu, its weekmenus and their orders.
#[instrument(skip(db))]
pub async fn delete_menu(db: &DatabaseConnection, menu_id: i64) -> Result<()> {
    let result = Menu::delete_by_id(menu_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::MenuNotFound { id: menu_id });
    }
    info!("Deleted menu {menu_id}");
    Ok(())
}

/// Lists menus by label, optionally narrowed by type and a label/description search.
pub async fn list_menus(
    db: &DatabaseConnection,
    menutype: Option<MenuType>,
    search: Option<&str>,
) -> Result<Vec<menu::Model>> {
    let mut query = Menu::find();
    if let Some(menutype) = menutype {
        query = query.filter(menu::Column::Menutype.eq(menutype.as_str()));
    }
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(menu::Column::Label.contains(search))
                .add(menu::Column::Description.contains(search)),
        );
    }
    query
        .order_by_asc(menu::Column::Label)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets or clears the stored image path of a menu.
#[instrument(skip(db))]
pub async fn set_menu_image(
    db: &DatabaseConnection,
    menu_id: i64,
    image_path: Option<String>,
) -> Result<menu::Model> {
    let mut menu: menu::ActiveModel = get_menu_by_id(db, menu_id)
        .await?
        .ok_or(Error::MenuNotFound { id: menu_id })?
        .into();
    menu.image_path = Set(image_path.filter(|p| !p.trim().is_empty()));
    menu.update(db).await.map_err(Into::into)
}
