//! Request queue business logic - submission, lookup, and terminal resolution.
//!
//! A request is created `pending` with a database-assigned id that serves as
//! its structured back-reference for the lifetime of the workflow: once the
//! bot posts the approval embed, the `(channel, message)` handle is recorded
//! on the row and reaction events are mapped back through
//! [`find_by_message`], never by parsing rendered text. [`resolve`] is a
//! compare-and-swap on `status = 'pending'`, which is what makes duplicate
//! reaction delivery safe: the first resolver wins and every later attempt
//! observes zero affected rows.

use crate::entities::{Request, request};
use crate::errors::{Error, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};
use tracing::debug;

use super::ledger::Bucket;

/// What a request proposes to do to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Credit the requester's selected bucket
    Grant,
    /// Move banked currency from the requester to the counterparty
    Transfer,
}

impl RequestKind {
    /// Storage code for the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grant => "grant",
            Self::Transfer => "transfer",
        }
    }

    /// Parses a storage code back into a kind.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "grant" => Some(Self::Grant),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }
}

/// Lifecycle status of a request. `Pending` is the only non-terminal state;
/// there are no transitions out of terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Awaiting an authorized signal
    Pending,
    /// Approved and applied to the ledger
    Approved,
    /// Denied; no ledger mutation happened
    Denied,
    /// Approval attempted but failed the at-approval-time funds check
    Failed,
}

impl RequestStatus {
    /// Storage code for the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Failed => "failed",
        }
    }

    /// Parses a storage code back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether the status is terminal.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Arguments for submitting a new request.
#[derive(Debug, Clone)]
pub struct NewRequest {
    /// Guild the request originates from
    pub guild_id: String,
    /// What the request proposes
    pub kind: RequestKind,
    /// Submitting member (transfer source)
    pub requester_id: String,
    /// Transfer destination; `None` for grants
    pub counterparty_id: Option<String>,
    /// Amount in copper, must be positive
    pub amount: i64,
    /// Free-text justification
    pub reason: String,
    /// Target bucket
    pub bucket: Bucket,
}

/// Submits a new request into the queue in `pending` state.
///
/// The amount must be a positive integer; anything else is rejected with
/// [`Error::InvalidAmount`] and never enters the queue. The returned model
/// carries the fresh database-assigned request id.
pub async fn submit(db: &DatabaseConnection, new: NewRequest) -> Result<request::Model> {
    if new.amount <= 0 {
        return Err(Error::InvalidAmount {
            input: new.amount.to_string(),
        });
    }

    let model = request::ActiveModel {
        guild_id: Set(new.guild_id),
        kind: Set(new.kind.as_str().to_string()),
        requester_id: Set(new.requester_id),
        counterparty_id: Set(new.counterparty_id),
        amount: Set(new.amount),
        reason: Set(new.reason),
        bucket: Set(new.bucket.as_str().to_string()),
        status: Set(RequestStatus::Pending.as_str().to_string()),
        channel_id: Set(None),
        message_id: Set(None),
        created_at: Set(chrono::Utc::now()),
        resolved_at: Set(None),
        resolved_by: Set(None),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    debug!(request_id = result.id, kind = %result.kind, "request submitted");
    Ok(result)
}

/// Fetches a request by id.
pub async fn get<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<request::Model>> {
    Request::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Resolves a request from the `(channel, message)` handle of its approval
/// embed. This is the structured linkage the reaction handler uses.
pub async fn find_by_message(
    db: &DatabaseConnection,
    channel_id: &str,
    message_id: &str,
) -> Result<Option<request::Model>> {
    Request::find()
        .filter(request::Column::ChannelId.eq(channel_id))
        .filter(request::Column::MessageId.eq(message_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All pending requests for a guild, oldest first.
pub async fn list_pending(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<Vec<request::Model>> {
    Request::find()
        .filter(request::Column::GuildId.eq(guild_id))
        .filter(request::Column::Status.eq(RequestStatus::Pending.as_str()))
        .order_by_asc(request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records the presentation handle of the posted approval embed.
pub async fn attach_message(
    db: &DatabaseConnection,
    id: i64,
    channel_id: &str,
    message_id: &str,
) -> Result<()> {
    let Some(existing) = get(db, id).await? else {
        return Err(Error::RequestNotFound { id });
    };

    let mut active: request::ActiveModel = existing.into();
    active.channel_id = Set(Some(channel_id.to_string()));
    active.message_id = Set(Some(message_id.to_string()));
    active.update(db).await?;
    Ok(())
}

/// Transitions a pending request into a terminal status.
///
/// Implemented as a conditional update on `status = 'pending'`: only the
/// first caller to observe `pending` wins the transition. A later attempt
/// affects zero rows and fails with [`Error::AlreadyResolved`]
/// ([`Error::RequestNotFound`] when the id is unknown), which is how
/// duplicate reaction events are made harmless.
pub async fn resolve<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    outcome: RequestStatus,
    resolved_by: &str,
) -> Result<()> {
    debug_assert!(outcome.is_terminal());

    let result = Request::update_many()
        .col_expr(request::Column::Status, Expr::value(outcome.as_str()))
        .col_expr(request::Column::ResolvedAt, Expr::value(chrono::Utc::now()))
        .col_expr(request::Column::ResolvedBy, Expr::value(resolved_by))
        .filter(request::Column::Id.eq(id))
        .filter(request::Column::Status.eq(RequestStatus::Pending.as_str()))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match get(conn, id).await? {
            Some(_) => Err(Error::AlreadyResolved { id }),
            None => Err(Error::RequestNotFound { id }),
        };
    }
    Ok(())
}
