//! Shared test utilities for `GuildCoffer`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test requests and guild configurations with sensible defaults.

use crate::core::guild::{self, ConfigUpdate};
use crate::core::ledger::Bucket;
use crate::core::request::{NewRequest, RequestKind};
use crate::entities::guild_config;
use crate::errors::Result;
use sea_orm::DatabaseConnection;

/// Role id used by [`seed_guild_config`] as the admin role.
pub const TEST_ADMIN_ROLE: &str = "test-admin-role";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Seeds a guild configuration whose admin role is [`TEST_ADMIN_ROLE`].
pub async fn seed_guild_config(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<guild_config::Model> {
    guild::upsert_config(
        db,
        ConfigUpdate {
            guild_id: guild_id.to_string(),
            admin_role_id: TEST_ADMIN_ROLE.to_string(),
            request_channel_id: None,
            gold_symbol: None,
            silver_symbol: None,
            copper_symbol: None,
        },
    )
    .await
}

/// A role list that passes the seeded guild's authorization check.
#[must_use]
pub fn admin_roles() -> Vec<String> {
    vec!["member".to_string(), TEST_ADMIN_ROLE.to_string()]
}

/// Grant-request submission args with sensible defaults (banked bucket,
/// canned reason).
#[must_use]
pub fn grant_request(guild_id: &str, requester_id: &str, amount: i64) -> NewRequest {
    NewRequest {
        guild_id: guild_id.to_string(),
        kind: RequestKind::Grant,
        requester_id: requester_id.to_string(),
        counterparty_id: None,
        amount,
        reason: "Test request".to_string(),
        bucket: Bucket::Banked,
    }
}

/// Transfer-request submission args with sensible defaults.
#[must_use]
pub fn transfer_request(
    guild_id: &str,
    requester_id: &str,
    counterparty_id: &str,
    amount: i64,
) -> NewRequest {
    NewRequest {
        guild_id: guild_id.to_string(),
        kind: RequestKind::Transfer,
        requester_id: requester_id.to_string(),
        counterparty_id: Some(counterparty_id.to_string()),
        amount,
        reason: "Test transfer".to_string(),
        bucket: Bucket::Banked,
    }
}
