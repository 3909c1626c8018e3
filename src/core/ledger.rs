//! Ledger business logic - the balance mutation primitive and audit log.
//!
//! [`adjust`] is the single choke point through which every balance change
//! flows, whether it originates from a direct admin command or from the
//! approval state machine. It enforces the non-negativity invariant (debits
//! clamp at zero) and runs inside whatever database transaction the caller
//! holds, which is what serializes concurrent mutations to the same account.
//! Each applied mutation also appends one [`ledger_entry`] audit row; the
//! audit log is display-only and never read back by business logic.

use crate::entities::{Account, LedgerEntry, account, ledger_entry};
use crate::errors::{Error, Result};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::debug;

/// One of the named sub-balances on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Spendable currency
    Banked,
    /// Currency owed
    Debt,
}

impl Bucket {
    /// Storage code for the bucket.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Banked => "banked",
            Self::Debt => "debt",
        }
    }

    /// Parses a storage code back into a bucket.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "banked" => Some(Self::Banked),
            "debt" => Some(Self::Debt),
            _ => None,
        }
    }
}

/// Audit log category for a balance mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Direct or approved credit
    Grant,
    /// Direct deduction
    Deduct,
    /// Credit side of an approved transfer
    TransferIn,
    /// Debit side of an approved transfer
    TransferOut,
}

impl EntryType {
    /// Storage code for the entry type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grant => "grant",
            Self::Deduct => "deduct",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
        }
    }
}

/// Result of one [`adjust`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    /// Bucket balance before the mutation
    pub previous: i64,
    /// Bucket balance after the mutation
    pub new: i64,
}

impl Adjustment {
    /// The delta actually applied, which differs from the requested delta
    /// when a debit clamped at zero.
    pub const fn applied(self) -> i64 {
        self.new - self.previous
    }
}

/// Fetches an account, `None` if the member has never been referenced.
pub async fn get_account(
    db: &DatabaseConnection,
    guild_id: &str,
    user_id: &str,
) -> Result<Option<account::Model>> {
    Account::find()
        .filter(account::Column::GuildId.eq(guild_id))
        .filter(account::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fetches an account, creating it with zero balances on first reference.
///
/// `(guild_id, user_id)` carries a unique index, so two concurrent
/// first-reference writers cannot both insert: the loser hits the unique
/// constraint and picks up the winner's row instead.
pub async fn get_or_create_account<C: ConnectionTrait>(
    conn: &C,
    guild_id: &str,
    user_id: &str,
) -> Result<account::Model> {
    let existing = Account::find()
        .filter(account::Column::GuildId.eq(guild_id))
        .filter(account::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    if let Some(account) = existing {
        return Ok(account);
    }

    debug!(guild_id, user_id, "creating account on first reference");
    let account = account::ActiveModel {
        guild_id: Set(guild_id.to_string()),
        user_id: Set(user_id.to_string()),
        banked: Set(0),
        debt: Set(0),
        ..Default::default()
    };
    match account.insert(conn).await {
        Ok(created) => Ok(created),
        Err(e) if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) => {
            // Lost the first-reference race; the winner's row is the account
            Account::find()
                .filter(account::Column::GuildId.eq(guild_id))
                .filter(account::Column::UserId.eq(user_id))
                .one(conn)
                .await?
                .ok_or(Error::Database(e))
        }
        Err(e) => Err(e.into()),
    }
}

/// Applies a signed delta to one bucket of one account: the atomic
/// read-modify-write shared by direct admin mutations and the approval
/// state machine.
///
/// Debits clamp at zero (balances never go negative); credits
/// unconditionally succeed. The caller's enclosing database transaction is
/// the critical section that keeps two concurrent adjustments to the same
/// account from interleaving.
pub async fn adjust<C: ConnectionTrait>(
    conn: &C,
    guild_id: &str,
    user_id: &str,
    bucket: Bucket,
    delta: i64,
) -> Result<Adjustment> {
    let account = get_or_create_account(conn, guild_id, user_id).await?;
    let previous = match bucket {
        Bucket::Banked => account.banked,
        Bucket::Debt => account.debt,
    };
    let new = previous.saturating_add(delta).max(0);

    let mut active: account::ActiveModel = account.into();
    match bucket {
        Bucket::Banked => active.banked = Set(new),
        Bucket::Debt => active.debt = Set(new),
    }
    active.update(conn).await?;

    Ok(Adjustment { previous, new })
}

/// Appends one audit log row for an applied mutation.
pub async fn record_entry<C: ConnectionTrait>(
    conn: &C,
    guild_id: &str,
    user_id: &str,
    bucket: Bucket,
    amount: i64,
    entry_type: EntryType,
    reason: &str,
    actor_id: &str,
) -> Result<ledger_entry::Model> {
    let entry = ledger_entry::ActiveModel {
        guild_id: Set(guild_id.to_string()),
        user_id: Set(user_id.to_string()),
        bucket: Set(bucket.as_str().to_string()),
        amount: Set(amount),
        entry_type: Set(entry_type.as_str().to_string()),
        reason: Set(reason.to_string()),
        actor_id: Set(actor_id.to_string()),
        timestamp: Set(chrono::Utc::now()),
        ..Default::default()
    };
    entry.insert(conn).await.map_err(Into::into)
}

/// Credits `amount` into a member's bucket and logs it, as one database
/// transaction. Used by the direct admin `/give` command.
pub async fn grant(
    db: &DatabaseConnection,
    guild_id: &str,
    user_id: &str,
    bucket: Bucket,
    amount: i64,
    reason: &str,
    actor_id: &str,
) -> Result<i64> {
    if amount <= 0 {
        return Err(Error::InvalidAmount {
            input: amount.to_string(),
        });
    }

    let txn = db.begin().await?;
    let adjustment = adjust(&txn, guild_id, user_id, bucket, amount).await?;
    record_entry(
        &txn,
        guild_id,
        user_id,
        bucket,
        adjustment.applied(),
        EntryType::Grant,
        reason,
        actor_id,
    )
    .await?;
    txn.commit().await?;
    Ok(adjustment.new)
}

/// Debits `amount` from a member's bucket (clamped at zero) and logs the
/// delta actually applied, as one database transaction. Used by the direct
/// admin `/take` command.
pub async fn deduct(
    db: &DatabaseConnection,
    guild_id: &str,
    user_id: &str,
    bucket: Bucket,
    amount: i64,
    reason: &str,
    actor_id: &str,
) -> Result<i64> {
    if amount <= 0 {
        return Err(Error::InvalidAmount {
            input: amount.to_string(),
        });
    }

    let txn = db.begin().await?;
    let adjustment = adjust(&txn, guild_id, user_id, bucket, -amount).await?;
    record_entry(
        &txn,
        guild_id,
        user_id,
        bucket,
        adjustment.applied(),
        EntryType::Deduct,
        reason,
        actor_id,
    )
    .await?;
    txn.commit().await?;
    Ok(adjustment.new)
}

/// Returns a member's most recent audit log entries, newest first.
pub async fn recent_entries(
    db: &DatabaseConnection,
    guild_id: &str,
    user_id: &str,
    limit: u64,
) -> Result<Vec<ledger_entry::Model>> {
    LedgerEntry::find()
        .filter(ledger_entry::Column::GuildId.eq(guild_id))
        .filter(ledger_entry::Column::UserId.eq(user_id))
        .order_by_desc(ledger_entry::Column::Timestamp)
        .order_by_desc(ledger_entry::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_accounts_created_lazily_with_zero_balances() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_account(&db, "g1", "u1").await?.is_none());

        let account = get_or_create_account(&db, "g1", "u1").await?;
        assert_eq!(account.banked, 0);
        assert_eq!(account.debt, 0);

        // Second call returns the same row
        let again = get_or_create_account(&db, "g1", "u1").await?;
        assert_eq!(again.id, account.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_account_rows_are_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        get_or_create_account(&db, "g1", "u1").await?;

        // A second row for the same (guild, user) violates the unique index
        let duplicate = account::ActiveModel {
            guild_id: Set("g1".to_string()),
            user_id: Set("u1".to_string()),
            banked: Set(100),
            debt: Set(0),
            ..Default::default()
        };
        assert!(duplicate.insert(&db).await.is_err());

        // Mutations land on the single surviving row
        adjust(&db, "g1", "u1", Bucket::Banked, 50).await?;
        let rows = Account::find()
            .filter(account::Column::GuildId.eq("g1"))
            .filter(account::Column::UserId.eq("u1"))
            .all(&db)
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].banked, 50);
        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_credits_and_debits() -> Result<()> {
        let db = setup_test_db().await?;

        let up = adjust(&db, "g1", "u1", Bucket::Banked, 500).await?;
        assert_eq!(up.previous, 0);
        assert_eq!(up.new, 500);
        assert_eq!(up.applied(), 500);

        let down = adjust(&db, "g1", "u1", Bucket::Banked, -200).await?;
        assert_eq!(down.new, 300);
        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_clamps_at_zero() -> Result<()> {
        let db = setup_test_db().await?;
        adjust(&db, "g1", "u1", Bucket::Banked, 100).await?;

        let clamped = adjust(&db, "g1", "u1", Bucket::Banked, -250).await?;
        assert_eq!(clamped.previous, 100);
        assert_eq!(clamped.new, 0);
        assert_eq!(clamped.applied(), -100);

        let account = get_account(&db, "g1", "u1").await?.unwrap();
        assert_eq!(account.banked, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_buckets_are_independent() -> Result<()> {
        let db = setup_test_db().await?;
        adjust(&db, "g1", "u1", Bucket::Banked, 100).await?;
        adjust(&db, "g1", "u1", Bucket::Debt, 40).await?;

        let account = get_account(&db, "g1", "u1").await?.unwrap();
        assert_eq!(account.banked, 100);
        assert_eq!(account.debt, 40);
        Ok(())
    }

    #[tokio::test]
    async fn test_grant_validates_amount() -> Result<()> {
        let db = setup_test_db().await?;
        for bad in [0, -1] {
            let result = grant(&db, "g1", "u1", Bucket::Banked, bad, "r", "admin").await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_grant_and_deduct_log_applied_deltas() -> Result<()> {
        let db = setup_test_db().await?;

        grant(&db, "g1", "u1", Bucket::Banked, 300, "payout", "admin").await?;
        // Over-deduction clamps, and the log records the actual change
        let new = deduct(&db, "g1", "u1", Bucket::Banked, 500, "fine", "admin").await?;
        assert_eq!(new, 0);

        let entries = recent_entries(&db, "g1", "u1", 10).await?;
        assert_eq!(entries.len(), 2);
        // Newest first
        assert_eq!(entries[0].entry_type, "deduct");
        assert_eq!(entries[0].amount, -300);
        assert_eq!(entries[0].actor_id, "admin");
        assert_eq!(entries[1].entry_type, "grant");
        assert_eq!(entries[1].amount, 300);
        Ok(())
    }

    #[test]
    fn test_bucket_codec_round_trips() {
        for bucket in [Bucket::Banked, Bucket::Debt] {
            assert_eq!(Bucket::parse(bucket.as_str()), Some(bucket));
        }
        assert_eq!(Bucket::parse("gold"), None);
    }
}
