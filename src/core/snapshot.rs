//! Versioned backup/restore snapshots.
//!
//! `/backup` exports one guild's accounts as versioned JSON; `/restore`
//! ingests either that format or the legacy flat `{"<user_id>": <copper>}`
//! map the original file-backed bot wrote, migrating legacy balances into
//! the dual-bucket model (balance becomes `banked`, `debt` starts at zero)
//! at this boundary so the state machine only ever sees the current schema.
//! Restore is an admin-level bulk overwrite of the guild's accounts.

use crate::entities::{Account, account};
use crate::errors::{Error, Result};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 2;

/// One account in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotAccount {
    /// Discord user ID of the account holder
    pub user_id: String,
    /// Banked balance in copper
    pub banked: i64,
    /// Debt balance in copper
    pub debt: i64,
}

/// A guild's exported account state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version; see [`SNAPSHOT_VERSION`]
    pub version: u32,
    /// All accounts in the guild, ordered by user id
    pub accounts: Vec<SnapshotAccount>,
}

/// Exports every account of a guild, ordered by user id for stable output.
pub async fn export_guild(db: &DatabaseConnection, guild_id: &str) -> Result<Snapshot> {
    let accounts = Account::find()
        .filter(account::Column::GuildId.eq(guild_id))
        .order_by_asc(account::Column::UserId)
        .all(db)
        .await?;

    Ok(Snapshot {
        version: SNAPSHOT_VERSION,
        accounts: accounts
            .into_iter()
            .map(|a| SnapshotAccount {
                user_id: a.user_id,
                banked: a.banked,
                debt: a.debt,
            })
            .collect(),
    })
}

/// Serializes a snapshot as pretty-printed JSON.
pub fn to_json(snapshot: &Snapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).map_err(Into::into)
}

/// Parses snapshot bytes, accepting the current versioned format or the
/// legacy flat balance map.
pub fn parse(bytes: &[u8]) -> Result<Snapshot> {
    if let Ok(snapshot) = serde_json::from_slice::<Snapshot>(bytes) {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::Config {
                message: format!(
                    "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                    snapshot.version
                ),
            });
        }
        return Ok(snapshot);
    }

    // Legacy format: a flat user-id -> copper map with a single balance
    if let Ok(legacy) = serde_json::from_slice::<BTreeMap<String, i64>>(bytes) {
        info!(accounts = legacy.len(), "migrating legacy snapshot");
        return Ok(migrate_legacy(&legacy));
    }

    Err(Error::Config {
        message: "unrecognized snapshot format".to_string(),
    })
}

/// Migrates a legacy single-balance map into the dual-bucket model. Negative
/// legacy balances (which some revisions could produce) clamp to zero to
/// restore the non-negativity invariant.
pub fn migrate_legacy(balances: &BTreeMap<String, i64>) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION,
        accounts: balances
            .iter()
            .map(|(user_id, balance)| SnapshotAccount {
                user_id: user_id.clone(),
                banked: (*balance).max(0),
                debt: 0,
            })
            .collect(),
    }
}

/// Replaces a guild's accounts with the snapshot contents, as one database
/// transaction. Returns the number of restored accounts. Balances clamp at
/// zero on the way in; the invariant holds regardless of file contents.
pub async fn restore_guild(
    db: &DatabaseConnection,
    guild_id: &str,
    snapshot: &Snapshot,
) -> Result<usize> {
    let txn = db.begin().await?;

    Account::delete_many()
        .filter(account::Column::GuildId.eq(guild_id))
        .exec(&txn)
        .await?;

    for entry in &snapshot.accounts {
        let model = account::ActiveModel {
            guild_id: Set(guild_id.to_string()),
            user_id: Set(entry.user_id.clone()),
            banked: Set(entry.banked.max(0)),
            debt: Set(entry.debt.max(0)),
            ..Default::default()
        };
        model.insert(&txn).await?;
    }

    txn.commit().await?;
    info!(guild_id, accounts = snapshot.accounts.len(), "guild accounts restored");
    Ok(snapshot.accounts.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger::{self, Bucket};
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_export_restore_round_trip() -> Result<()> {
        let db = setup_test_db().await?;
        ledger::grant(&db, "g1", "alice", Bucket::Banked, 500, "seed", "admin").await?;
        ledger::grant(&db, "g1", "bob", Bucket::Debt, 70, "seed", "admin").await?;
        // Another guild's data must not leak into the export
        ledger::grant(&db, "g2", "carol", Bucket::Banked, 999, "seed", "admin").await?;

        let snapshot = export_guild(&db, "g1").await?;
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.accounts.len(), 2);

        let json = to_json(&snapshot)?;
        let reparsed = parse(json.as_bytes())?;
        assert_eq!(reparsed, snapshot);

        // Wipe alice, then restore and check she is back
        ledger::deduct(&db, "g1", "alice", Bucket::Banked, 500, "wipe", "admin").await?;
        let restored = restore_guild(&db, "g1", &reparsed).await?;
        assert_eq!(restored, 2);

        let alice = ledger::get_account(&db, "g1", "alice").await?.unwrap();
        assert_eq!(alice.banked, 500);
        let carol = ledger::get_account(&db, "g2", "carol").await?.unwrap();
        assert_eq!(carol.banked, 999);
        Ok(())
    }

    #[test]
    fn test_parse_legacy_flat_map() {
        let legacy = br#"{"1001": 12345, "1002": 0, "1003": -50}"#;
        let snapshot = parse(legacy).unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.accounts.len(), 3);

        let first = &snapshot.accounts[0];
        assert_eq!(first.user_id, "1001");
        assert_eq!(first.banked, 12_345);
        assert_eq!(first.debt, 0);
        // Negative legacy balance clamps to zero
        assert_eq!(snapshot.accounts[2].banked, 0);
    }

    #[test]
    fn test_parse_rejects_unknown_version_and_garbage() {
        let future = br#"{"version": 3, "accounts": []}"#;
        assert!(matches!(parse(future), Err(Error::Config { .. })));
        assert!(matches!(parse(b"not json"), Err(Error::Config { .. })));
        assert!(matches!(parse(b"[1,2,3]"), Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_restore_replaces_existing_accounts() -> Result<()> {
        let db = setup_test_db().await?;
        ledger::grant(&db, "g1", "old-user", Bucket::Banked, 100, "seed", "admin").await?;

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            accounts: vec![SnapshotAccount {
                user_id: "new-user".to_string(),
                banked: 42,
                debt: 0,
            }],
        };
        restore_guild(&db, "g1", &snapshot).await?;

        assert!(ledger::get_account(&db, "g1", "old-user").await?.is_none());
        let new_user = ledger::get_account(&db, "g1", "new-user").await?.unwrap();
        assert_eq!(new_user.banked, 42);
        Ok(())
    }
}
