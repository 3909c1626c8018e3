//! Ledger entry entity - Append-only audit log of balance mutations.
//!
//! One row per affected account per mutation (a transfer appends two).
//! `amount` is signed; `entry_type` is `"grant"`, `"deduct"`, `"transfer_in"`,
//! or `"transfer_out"`. Entries are only ever read for `/history` display;
//! the approval state machine never consults them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Guild the mutation happened in
    pub guild_id: String,
    /// Account holder whose balance changed
    pub user_id: String,
    /// Bucket that changed: `"banked"` or `"debt"`
    pub bucket: String,
    /// Signed delta in copper (positive for credit, negative for debit)
    pub amount: i64,
    /// Mutation category: `"grant"`, `"deduct"`, `"transfer_in"`, `"transfer_out"`
    pub entry_type: String,
    /// Human-readable reason carried from the originating command or request
    pub reason: String,
    /// Discord user ID of the acting party (admin or approver)
    pub actor_id: String,
    /// When the mutation was applied
    pub timestamp: DateTimeUtc,
}

/// Audit rows stand alone; no foreign-key relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
