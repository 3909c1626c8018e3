//! Guild config entity - Per-community settings written by `/setup`.
//!
//! The approval workflow treats this row as read-only input: the admin role
//! gates approvals and direct admin commands, the request channel (when set)
//! receives approval embeds, and the symbol overrides replace the default
//! `g`/`s`/`c` suffixes in rendered amounts (typically custom guild emoji).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Guild configuration database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guild_configs")]
pub struct Model {
    /// Discord guild ID this configuration applies to
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: String,
    /// Role whose holders may approve requests and run admin commands
    pub admin_role_id: String,
    /// Channel approval embeds are posted to; invoking channel when `None`
    pub request_channel_id: Option<String>,
    /// Display override for the gold denomination
    pub gold_symbol: Option<String>,
    /// Display override for the silver denomination
    pub silver_symbol: Option<String>,
    /// Display override for the copper denomination
    pub copper_symbol: Option<String>,
}

/// Configuration rows stand alone; no foreign-key relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
