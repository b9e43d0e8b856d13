//! Database configuration module for `MenuBuddy`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Composite unique constraints that the
//! entity macros cannot express are added as explicit indexes.

use crate::entities::{
    Group, Invoice, InvoiceItem, Menu, Order, RegistrationToken, User, Weekmenu, invoice, order,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/menu_buddy.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all necessary database tables and unique indexes if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table_for(db, &schema, Group).await?;
    create_table_for(db, &schema, User).await?;
    create_table_for(db, &schema, Menu).await?;
    create_table_for(db, &schema, Weekmenu).await?;
    create_table_for(db, &schema, Order).await?;
    create_table_for(db, &schema, Invoice).await?;
    create_table_for(db, &schema, InvoiceItem).await?;
    create_table_for(db, &schema, RegistrationToken).await?;

    // One order row per (user, weekmenu, week, year)
    let order_bucket_index = Index::create()
        .name("idx_orders_user_weekmenu_week_year")
        .table(Order)
        .col(order::Column::UserId)
        .col(order::Column::WeekmenuId)
        .col(order::Column::Week)
        .col(order::Column::Year)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&order_bucket_index)).await?;

    let invoice_number_index = Index::create()
        .name("idx_invoices_user_number")
        .table(Invoice)
        .col(invoice::Column::UserId)
        .col(invoice::Column::InvoiceNumber)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&invoice_number_index)).await?;

    info!("Database tables ensured.");
    Ok(())
}
