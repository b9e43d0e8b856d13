/// Database configuration and connection management
pub mod database;

/// Application settings loaded from config.toml
pub mod settings;

/// Admin bootstrap configuration from environment variables
pub mod users;
