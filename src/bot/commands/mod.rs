//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Back office catalog commands (menus, groups)
pub mod catalog;

/// Client ordering commands
pub mod client;

/// Back office client and invite commands
pub mod clients;

/// General utility commands
pub mod general;

/// Back office order commands
pub mod orders;

/// Back office invoice and dashboard commands
pub mod reports;

/// Back office weekmenu commands
pub mod weekmenu;

// Export commands
pub use catalog::*;
pub use client::*;
pub use clients::*;
pub use general::*;
pub use orders::*;
pub use reports::*;
pub use weekmenu::*;
