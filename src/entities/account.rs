//! Account entity - Represents one member's currency holdings in one guild.
//!
//! Balances are stored in copper minor units across two independent buckets:
//! `banked` (spendable currency) and `debt` (currency owed). Both are always
//! non-negative; deductions clamp at zero. Rows are created lazily on first
//! reference and never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild this account belongs to
    pub guild_id: String,
    /// Discord user ID of the account holder
    pub user_id: String,
    /// Spendable balance in copper, never negative
    pub banked: i64,
    /// Outstanding debt in copper, never negative
    pub debt: i64,
}

/// Accounts are looked up by `(guild_id, user_id)`; no foreign-key relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
