//! Core business logic - framework-agnostic operations on the ledger,
//! request queue, and approval state machine.
//!
//! Nothing in this tree touches Discord types: the bot layer maps platform
//! events onto these functions and renders their outcomes. Every balance
//! mutation flows through [`ledger::adjust`], and every request status
//! change flows through [`request::resolve`].

/// Approval state machine for pending requests
pub mod approval;
/// Copper amount formatting and parsing
pub mod currency;
/// Per-guild configuration access
pub mod guild;
/// Balance mutation primitive and audit log
pub mod ledger;
/// Request queue: submission, lookup, and terminal resolution
pub mod request;
/// Versioned backup/restore snapshots with legacy migration
pub mod snapshot;
