//! Unified error type for the ordering core and the Discord layer.

use thiserror::Error;

/// All errors surfaced by `MenuBuddy`.
///
/// Every error is request-scoped: it aborts the current command and is reported
/// back to the caller, nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// A single input field failed validation
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// Order quantity outside the accepted range
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// Price or amount that is negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Referenced user does not exist
    #[error("User not found: {id}")]
    UserNotFound {
        /// User id
        id: i64,
    },

    /// Referenced group does not exist
    #[error("Group not found: {name}")]
    GroupNotFound {
        /// Group id or slug
        name: String,
    },

    /// Referenced menu does not exist
    #[error("Menu not found: {id}")]
    MenuNotFound {
        /// Menu id
        id: i64,
    },

    /// Referenced weekmenu does not exist
    #[error("Weekmenu not found: {id}")]
    WeekmenuNotFound {
        /// Weekmenu id
        id: i64,
    },

    /// Referenced order does not exist
    #[error("Order not found: {id}")]
    OrderNotFound {
        /// Order id
        id: i64,
    },

    /// Referenced invoice does not exist
    #[error("Invoice not found: {id}")]
    InvoiceNotFound {
        /// Invoice id
        id: i64,
    },

    /// Referenced registration token does not exist
    #[error("Registration token not found: {id}")]
    TokenNotFound {
        /// Token row id
        id: i64,
    },

    /// Not enough remaining stock to commit the requested quantity
    #[error("Insufficient stock: requested {requested}, only {remaining} remaining")]
    InsufficientStock {
        /// Units requested
        requested: i32,
        /// Units still available
        remaining: i32,
    },

    /// The weekmenu stock moved between the read and the guarded decrement
    #[error("Stock for weekmenu {weekmenu_id} changed while the order was being placed")]
    StockChanged {
        /// Weekmenu id
        weekmenu_id: i64,
    },

    /// Registration token is unknown or outside its validity window
    #[error("Invalid or expired registration token. Tokens are valid for 3 days.")]
    InvalidToken,

    /// Caller lacks the role required for the command
    #[error("You are not allowed to use this command")]
    Forbidden,

    /// `SeaORM` database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Failure while formatting a message
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Integer conversion overflow
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
