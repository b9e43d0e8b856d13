//! Shared test utilities for `MenuBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        group,
        menu::{self, MenuType},
        user::{self, ClientInput},
        week::WeekKey,
        weekmenu,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// The bucket most tests place their weekmenus in.
pub const TEST_WEEK: WeekKey = WeekKey::new(10, 2025);

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an active test group whose name is derived from the slug.
pub async fn create_test_group(db: &DatabaseConnection, slug: &str) -> Result<entities::group::Model> {
    group::create_group(db, format!("Group {slug}"), slug.to_string()).await
}

/// Creates a test client in the given group.
///
/// # Defaults
/// * `username`: `"<name>@example.com"` (lowercased)
/// * `phone`: None
/// * `discord_id`: None
pub async fn create_test_client(
    db: &DatabaseConnection,
    name: &str,
    group_id: i64,
) -> Result<entities::user::Model> {
    user::create_client(
        db,
        ClientInput {
            name: name.to_string(),
            username: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            group_id: Some(group_id),
            discord_id: None,
        },
    )
    .await
}

/// Creates a normal test menu with the given label and price.
pub async fn create_test_menu(
    db: &DatabaseConnection,
    label: &str,
    price: f64,
) -> Result<entities::menu::Model> {
    menu::create_menu(db, label.to_string(), None, price, MenuType::Normal).await
}

/// Creates a test weekmenu.
pub async fn create_test_weekmenu(
    db: &DatabaseConnection,
    menu_id: i64,
    week: WeekKey,
    group_id: Option<i64>,
    quantity: i32,
) -> Result<entities::weekmenu::Model> {
    weekmenu::create_weekmenu(db, menu_id, week, group_id, quantity).await
}

/// Sets up a complete test environment with a client and one global weekmenu
/// in [`TEST_WEEK`] with `quantity` units of a 10.0 menu.
/// Returns (db, client, weekmenu) for ordering scenarios.
pub async fn setup_with_weekmenu(
    quantity: i32,
) -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::weekmenu::Model,
)> {
    let db = setup_test_db().await?;
    let group = create_test_group(&db, "test").await?;
    let client = create_test_client(&db, "Alice", group.id).await?;
    let menu = create_test_menu(&db, "Test Menu", 10.0).await?;
    let weekmenu = create_test_weekmenu(&db, menu.id, TEST_WEEK, None, quantity).await?;
    Ok((db, client, weekmenu))
}
