//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Guild setup, backup, and restore commands
pub mod admin;
/// General utility commands
pub mod general;
/// Balance and direct admin mutation commands
pub mod ledger;
/// Request submission and pending-queue commands
pub mod request;
/// Shared helpers for command implementations
pub mod utils;
