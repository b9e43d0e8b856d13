//! `MenuBuddy` - weekly menu ordering for a small meal service, run from Discord.
//!
//! Admins put menus on offer per ISO week (a *weekmenu*) with a fixed number of
//! portions. Clients order from the current week, or pre-order from the earliest
//! future week an admin has opened. Placing, editing or deleting an order moves the
//! weekmenu's remaining stock by the same amount in one SQLite transaction.
//!
//! The back office covers delivery groups, client accounts, registration invites,
//! invoices with a VAT split, a weekly CSV export and a quarterly dashboard.
//!
//! The `core` module holds the database-level operations and knows nothing about
//! Discord; `bot` maps slash commands onto them.

#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
#![warn(
    // Poise's generated command items carry no docs, so this cannot be a deny
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::too_many_lines,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
)]

/// Slash commands for clients and admins, plus the poise setup
pub mod bot;
/// Database connection, `config.toml` settings and admin ids
pub mod config;
/// Order ledger, weekmenu stock, ordering window and reports
pub mod core;
/// SeaORM entities, one per table
pub mod entities;
/// Crate-wide error type
pub mod errors;

#[cfg(test)]
pub mod test_utils;
