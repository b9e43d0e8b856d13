//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod group;
pub mod invoice;
pub mod invoice_item;
pub mod menu;
pub mod order;
pub mod registration_token;
pub mod user;
pub mod weekmenu;

// Re-export specific types to avoid conflicts
pub use group::{Column as GroupColumn, Entity as Group, Model as GroupModel};
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, Model as InvoiceModel};
pub use invoice_item::{
    Column as InvoiceItemColumn, Entity as InvoiceItem, Model as InvoiceItemModel,
};
pub use menu::{Column as MenuColumn, Entity as Menu, Model as MenuModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use registration_token::{
    Column as RegistrationTokenColumn, Entity as RegistrationToken,
    Model as RegistrationTokenModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use weekmenu::{Column as WeekmenuColumn, Entity as Weekmenu, Model as WeekmenuModel};
