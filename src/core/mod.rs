//! Core business logic - framework-agnostic operations over the database.
//!
//! Nothing in here knows about Discord. The bot layer calls these functions and
//! renders their results.

/// Order confirmation rendering
pub mod confirmation;
/// Delivery group management
pub mod group;
/// Registration invites
pub mod invite;
/// Invoice storage and VAT split
pub mod invoice;
/// Menu catalog
pub mod menu;
/// Order ledger - placement, edits and reassignment
pub mod order;
/// Read-only projections for overviews, history, dashboard and export
pub mod report;
/// Client and admin accounts
pub mod user;
/// Week bucket arithmetic
pub mod week;
/// Weekmenu availability
pub mod weekmenu;
/// Ordering window resolution (current week or pre-order)
pub mod window;
