//! Discord interaction handlers
//!
//! This module provides handlers that commands share: autocomplete for command
//! parameters, access checks and reply helpers.

/// Parsing of free-text command arguments
pub mod args;
/// Autocomplete handlers for offerings, menus, clients and groups
pub mod autocomplete;
/// Access checks and caller resolution
pub mod checks;
/// Reply helpers
pub mod reply;
