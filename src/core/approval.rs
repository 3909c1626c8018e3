//! Approval state machine - turns authorized reaction signals into ledger
//! mutations and terminal request statuses.
//!
//! [`handle_signal`] is deliberately forgiving at the edges: unknown
//! requests, already-resolved requests, unconfigured guilds, and
//! unauthorized actors all degrade to [`SignalOutcome::Ignored`] rather than
//! an error, because the presentation layer may deliver the same reaction
//! event more than once, deliver it late, or echo the bot's own reactions.
//! Everything that mutates state runs inside one database transaction, and
//! the terminal status transition is the compare-and-swap in
//! [`request::resolve`]; losing that race rolls the whole transaction back.

use crate::entities::request::Model as RequestModel;
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, warn};

use super::guild;
use super::ledger::{self, Bucket, EntryType};
use super::request::{self, RequestKind, RequestStatus};

/// An approve/deny input event from an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Apply the request
    Approve,
    /// Discard the request without mutating the ledger
    Deny,
}

/// Why a signal was silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No request is linked to the signal
    UnknownRequest,
    /// The request already reached a terminal status
    AlreadyResolved,
    /// The guild has no configuration row, so nobody is authorized
    Unconfigured,
    /// The actor lacks the guild's admin role
    Unauthorized,
}

/// Result of handling one signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The signal had no effect; nothing is surfaced to the actor
    Ignored(IgnoreReason),
    /// The request was applied to the ledger
    Approved {
        /// The resolved request
        request: RequestModel,
    },
    /// The request was discarded without a ledger mutation
    Denied {
        /// The resolved request
        request: RequestModel,
    },
    /// A transfer approval failed the at-approval-time funds check; the
    /// request is terminal (`failed`) and no balances changed
    InsufficientFunds {
        /// The resolved request
        request: RequestModel,
        /// Source bucket balance observed at approval time
        available: i64,
    },
}

/// Handles one approve/deny signal against a request.
///
/// `actor_roles` is the actor's role-id list as supplied by the adapter;
/// authority means holding the guild's configured admin role. The function
/// only errors on infrastructure failures (database, corrupt rows) - every
/// expected edge degrades to `Ignored`.
pub async fn handle_signal(
    db: &DatabaseConnection,
    request_id: i64,
    actor_id: &str,
    actor_roles: &[String],
    signal: Signal,
) -> Result<SignalOutcome> {
    let Some(req) = request::get(db, request_id).await? else {
        return Ok(SignalOutcome::Ignored(IgnoreReason::UnknownRequest));
    };
    if req.status != RequestStatus::Pending.as_str() {
        return Ok(SignalOutcome::Ignored(IgnoreReason::AlreadyResolved));
    }

    let Some(config) = guild::get_config(db, &req.guild_id).await? else {
        warn!(guild_id = %req.guild_id, "signal for unconfigured guild");
        return Ok(SignalOutcome::Ignored(IgnoreReason::Unconfigured));
    };
    if !guild::is_authorized(&config, actor_roles) {
        return Ok(SignalOutcome::Ignored(IgnoreReason::Unauthorized));
    }

    match signal {
        Signal::Deny => deny(db, &req, actor_id).await,
        Signal::Approve => {
            let kind = RequestKind::parse(&req.kind).ok_or_else(|| Error::Config {
                message: format!("request {} has unknown kind {:?}", req.id, req.kind),
            })?;
            match kind {
                RequestKind::Grant => approve_grant(db, &req, actor_id).await,
                RequestKind::Transfer => approve_transfer(db, &req, actor_id).await,
            }
        }
    }
}

fn bucket_of(req: &RequestModel) -> Result<Bucket> {
    Bucket::parse(&req.bucket).ok_or_else(|| Error::Config {
        message: format!("request {} has unknown bucket {:?}", req.id, req.bucket),
    })
}

/// Maps a lost resolution race onto `Ignored`, propagating real failures.
fn race_to_ignored(result: Result<()>) -> Result<Option<SignalOutcome>> {
    match result {
        Ok(()) => Ok(None),
        Err(Error::AlreadyResolved { .. } | Error::RequestNotFound { .. }) => Ok(Some(
            SignalOutcome::Ignored(IgnoreReason::AlreadyResolved),
        )),
        Err(e) => Err(e),
    }
}

async fn refetch(db: &DatabaseConnection, id: i64) -> Result<RequestModel> {
    request::get(db, id)
        .await?
        .ok_or(Error::RequestNotFound { id })
}

async fn deny(
    db: &DatabaseConnection,
    req: &RequestModel,
    actor_id: &str,
) -> Result<SignalOutcome> {
    let result = request::resolve(db, req.id, RequestStatus::Denied, actor_id).await;
    if let Some(ignored) = race_to_ignored(result)? {
        return Ok(ignored);
    }
    info!(request_id = req.id, actor_id, "request denied");
    Ok(SignalOutcome::Denied {
        request: refetch(db, req.id).await?,
    })
}

async fn approve_grant(
    db: &DatabaseConnection,
    req: &RequestModel,
    actor_id: &str,
) -> Result<SignalOutcome> {
    let bucket = bucket_of(req)?;
    let txn = db.begin().await?;

    // Win the status transition before touching balances; a lost race means
    // another signal already resolved this request.
    let resolved = request::resolve(&txn, req.id, RequestStatus::Approved, actor_id).await;
    if let Some(ignored) = race_to_ignored(resolved)? {
        txn.rollback().await?;
        return Ok(ignored);
    }

    ledger::adjust(&txn, &req.guild_id, &req.requester_id, bucket, req.amount).await?;
    ledger::record_entry(
        &txn,
        &req.guild_id,
        &req.requester_id,
        bucket,
        req.amount,
        EntryType::Grant,
        &req.reason,
        actor_id,
    )
    .await?;
    txn.commit().await?;

    info!(request_id = req.id, actor_id, amount = req.amount, "grant approved");
    Ok(SignalOutcome::Approved {
        request: refetch(db, req.id).await?,
    })
}

async fn approve_transfer(
    db: &DatabaseConnection,
    req: &RequestModel,
    actor_id: &str,
) -> Result<SignalOutcome> {
    let bucket = bucket_of(req)?;
    let recipient = req
        .counterparty_id
        .clone()
        .ok_or_else(|| Error::Config {
            message: format!("transfer request {} has no counterparty", req.id),
        })?;

    let txn = db.begin().await?;

    // The funds check happens at approval time, against the balance inside
    // this transaction, not against whatever the sender had at submission.
    let source = ledger::get_or_create_account(&txn, &req.guild_id, &req.requester_id).await?;
    let available = match bucket {
        Bucket::Banked => source.banked,
        Bucket::Debt => source.debt,
    };

    if available < req.amount {
        let resolved = request::resolve(&txn, req.id, RequestStatus::Failed, actor_id).await;
        if let Some(ignored) = race_to_ignored(resolved)? {
            txn.rollback().await?;
            return Ok(ignored);
        }
        txn.commit().await?;
        info!(
            request_id = req.id,
            available,
            required = req.amount,
            "transfer approval failed funds check"
        );
        return Ok(SignalOutcome::InsufficientFunds {
            request: refetch(db, req.id).await?,
            available,
        });
    }

    let debit = ledger::adjust(&txn, &req.guild_id, &req.requester_id, bucket, -req.amount).await?;
    ledger::adjust(&txn, &req.guild_id, &recipient, bucket, req.amount).await?;
    ledger::record_entry(
        &txn,
        &req.guild_id,
        &req.requester_id,
        bucket,
        debit.applied(),
        EntryType::TransferOut,
        &req.reason,
        actor_id,
    )
    .await?;
    ledger::record_entry(
        &txn,
        &req.guild_id,
        &recipient,
        bucket,
        req.amount,
        EntryType::TransferIn,
        &req.reason,
        actor_id,
    )
    .await?;

    let resolved = request::resolve(&txn, req.id, RequestStatus::Approved, actor_id).await;
    if let Some(ignored) = race_to_ignored(resolved)? {
        txn.rollback().await?;
        return Ok(ignored);
    }
    txn.commit().await?;

    info!(request_id = req.id, actor_id, amount = req.amount, "transfer approved");
    Ok(SignalOutcome::Approved {
        request: refetch(db, req.id).await?,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::request::NewRequest;
    use crate::test_utils::{
        admin_roles, grant_request, seed_guild_config, setup_test_db, transfer_request,
    };

    const GUILD: &str = "g1";
    const ADMIN: &str = "admin-user";

    async fn configured_db() -> Result<DatabaseConnection> {
        let db = setup_test_db().await?;
        seed_guild_config(&db, GUILD).await?;
        Ok(db)
    }

    #[tokio::test]
    async fn test_grant_approval_credits_exactly_once() -> Result<()> {
        // Scenario A: approve a 500-copper grant, then replay the signal.
        let db = configured_db().await?;
        let req = request::submit(&db, grant_request(GUILD, "alice", 500)).await?;

        let outcome =
            handle_signal(&db, req.id, ADMIN, &admin_roles(), Signal::Approve).await?;
        assert!(matches!(outcome, SignalOutcome::Approved { .. }));

        let account = ledger::get_account(&db, GUILD, "alice").await?.unwrap();
        assert_eq!(account.banked, 500);

        // Duplicate delivery of the same signal is a no-op
        let replay =
            handle_signal(&db, req.id, ADMIN, &admin_roles(), Signal::Approve).await?;
        assert_eq!(
            replay,
            SignalOutcome::Ignored(IgnoreReason::AlreadyResolved)
        );
        let account = ledger::get_account(&db, GUILD, "alice").await?.unwrap();
        assert_eq!(account.banked, 500);
        Ok(())
    }

    #[tokio::test]
    async fn test_underfunded_transfer_fails_terminally() -> Result<()> {
        // Scenario B: sender has 100, transfer asks for 150.
        let db = configured_db().await?;
        ledger::grant(&db, GUILD, "alice", Bucket::Banked, 100, "seed", ADMIN).await?;
        let req = request::submit(&db, transfer_request(GUILD, "alice", "bob", 150)).await?;

        let outcome =
            handle_signal(&db, req.id, ADMIN, &admin_roles(), Signal::Approve).await?;
        match outcome {
            SignalOutcome::InsufficientFunds { request, available } => {
                assert_eq!(available, 100);
                assert_eq!(request.status, "failed");
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }

        let alice = ledger::get_account(&db, GUILD, "alice").await?.unwrap();
        assert_eq!(alice.banked, 100);
        let bob = ledger::get_account(&db, GUILD, "bob").await?;
        assert!(bob.is_none_or(|a| a.banked == 0));

        // Terminal: a later approve signal cannot revive it
        let replay =
            handle_signal(&db, req.id, ADMIN, &admin_roles(), Signal::Approve).await?;
        assert_eq!(
            replay,
            SignalOutcome::Ignored(IgnoreReason::AlreadyResolved)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_funded_transfer_moves_balance_and_logs_both_sides() -> Result<()> {
        // Scenario C: 300 moves from alice (300) to bob (0).
        let db = configured_db().await?;
        ledger::grant(&db, GUILD, "alice", Bucket::Banked, 300, "seed", ADMIN).await?;
        let req = request::submit(&db, transfer_request(GUILD, "alice", "bob", 300)).await?;

        let outcome =
            handle_signal(&db, req.id, ADMIN, &admin_roles(), Signal::Approve).await?;
        assert!(matches!(outcome, SignalOutcome::Approved { .. }));

        let alice = ledger::get_account(&db, GUILD, "alice").await?.unwrap();
        let bob = ledger::get_account(&db, GUILD, "bob").await?.unwrap();
        assert_eq!(alice.banked, 0);
        assert_eq!(bob.banked, 300);

        let out = ledger::recent_entries(&db, GUILD, "alice", 10).await?;
        assert_eq!(out[0].entry_type, "transfer_out");
        assert_eq!(out[0].amount, -300);
        let inn = ledger::recent_entries(&db, GUILD, "bob", 10).await?;
        assert_eq!(inn.len(), 1);
        assert_eq!(inn[0].entry_type, "transfer_in");
        assert_eq!(inn[0].amount, 300);
        Ok(())
    }

    #[tokio::test]
    async fn test_deny_resolves_without_ledger_mutation() -> Result<()> {
        // Scenario D
        let db = configured_db().await?;
        let req = request::submit(&db, grant_request(GUILD, "alice", 500)).await?;

        let outcome = handle_signal(&db, req.id, ADMIN, &admin_roles(), Signal::Deny).await?;
        match outcome {
            SignalOutcome::Denied { request } => assert_eq!(request.status, "denied"),
            other => panic!("expected Denied, got {other:?}"),
        }

        assert!(ledger::get_account(&db, GUILD, "alice").await?.is_none());
        assert!(ledger::recent_entries(&db, GUILD, "alice", 10).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unauthorized_signal_is_silently_ignored() -> Result<()> {
        // Scenario E
        let db = configured_db().await?;
        let req = request::submit(&db, grant_request(GUILD, "alice", 500)).await?;

        let outcome = handle_signal(
            &db,
            req.id,
            "rando",
            &["some-other-role".to_string()],
            Signal::Approve,
        )
        .await?;
        assert_eq!(outcome, SignalOutcome::Ignored(IgnoreReason::Unauthorized));

        let fetched = request::get(&db, req.id).await?.unwrap();
        assert_eq!(fetched.status, "pending");
        assert!(ledger::get_account(&db, GUILD, "alice").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_request_is_ignored() -> Result<()> {
        let db = configured_db().await?;
        let outcome = handle_signal(&db, 424_242, ADMIN, &admin_roles(), Signal::Approve).await?;
        assert_eq!(outcome, SignalOutcome::Ignored(IgnoreReason::UnknownRequest));
        Ok(())
    }

    #[tokio::test]
    async fn test_unconfigured_guild_cannot_approve() -> Result<()> {
        let db = setup_test_db().await?;
        let req = request::submit(&db, grant_request("raw-guild", "alice", 100)).await?;

        let outcome =
            handle_signal(&db, req.id, ADMIN, &admin_roles(), Signal::Approve).await?;
        assert_eq!(outcome, SignalOutcome::Ignored(IgnoreReason::Unconfigured));
        assert_eq!(request::get(&db, req.id).await?.unwrap().status, "pending");
        Ok(())
    }

    #[tokio::test]
    async fn test_grant_can_target_debt_bucket() -> Result<()> {
        let db = configured_db().await?;
        let req = request::submit(
            &db,
            NewRequest {
                bucket: Bucket::Debt,
                ..grant_request(GUILD, "alice", 250)
            },
        )
        .await?;

        let outcome =
            handle_signal(&db, req.id, ADMIN, &admin_roles(), Signal::Approve).await?;
        assert!(matches!(outcome, SignalOutcome::Approved { .. }));

        let alice = ledger::get_account(&db, GUILD, "alice").await?.unwrap();
        assert_eq!(alice.banked, 0);
        assert_eq!(alice.debt, 250);
        Ok(())
    }

    #[tokio::test]
    async fn test_deny_then_approve_is_ignored() -> Result<()> {
        let db = configured_db().await?;
        ledger::grant(&db, GUILD, "alice", Bucket::Banked, 400, "seed", ADMIN).await?;
        let req = request::submit(&db, transfer_request(GUILD, "alice", "bob", 400)).await?;

        handle_signal(&db, req.id, ADMIN, &admin_roles(), Signal::Deny).await?;
        let outcome =
            handle_signal(&db, req.id, ADMIN, &admin_roles(), Signal::Approve).await?;
        assert_eq!(
            outcome,
            SignalOutcome::Ignored(IgnoreReason::AlreadyResolved)
        );

        let alice = ledger::get_account(&db, GUILD, "alice").await?.unwrap();
        assert_eq!(alice.banked, 400);
        Ok(())
    }
}
