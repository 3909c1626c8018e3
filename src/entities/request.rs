//! Request entity - A pending proposal to mutate the ledger.
//!
//! Each request carries a structured, persisted id that the reaction handler
//! resolves via the stored `(channel_id, message_id)` presentation handle,
//! never by parsing rendered text. `kind` is `"grant"` or `"transfer"`;
//! `status` is `"pending"`, `"approved"`, `"denied"`, or `"failed"`. Resolved
//! requests are retained with their terminal status for auditability and so
//! duplicate reaction events find a terminal row and are ignored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    /// Unique request id, assigned at submission
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Guild the request originates from
    pub guild_id: String,
    /// Request kind: `"grant"` or `"transfer"`
    pub kind: String,
    /// Discord user ID of the submitter (transfer source)
    pub requester_id: String,
    /// Transfer destination; `None` for grant requests
    pub counterparty_id: Option<String>,
    /// Requested amount in copper, always positive
    pub amount: i64,
    /// Free-text justification supplied at submission
    pub reason: String,
    /// Target balance bucket: `"banked"` or `"debt"`
    pub bucket: String,
    /// Lifecycle status: `"pending"`, `"approved"`, `"denied"`, or `"failed"`
    pub status: String,
    /// Channel the approval embed was posted to, once posted
    pub channel_id: Option<String>,
    /// Message id of the approval embed, once posted
    pub message_id: Option<String>,
    /// When the request was submitted
    pub created_at: DateTimeUtc,
    /// When the request reached a terminal status
    pub resolved_at: Option<DateTimeUtc>,
    /// Discord user ID of the admin who resolved it
    pub resolved_by: Option<String>,
}

/// Requests reference accounts by user-id string; no foreign-key relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
