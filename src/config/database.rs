//! Database configuration module for `GuildCoffer`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary
//! tables based on the entity definitions. The module uses `SeaORM`'s
//! `Schema::create_table_from_entity` method to generate SQL statements from the entity
//! models, ensuring that the database schema matches the Rust struct definitions without
//! requiring manual SQL.

use crate::config::AppConfig;
use crate::entities::{Account, AccountColumn, GuildConfig, LedgerEntry, Request};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/guild_coffer.sqlite?mode=rwc";

/// Resolves the database URL: config file first, then `DATABASE_URL`, then
/// a default local `SQLite` file.
pub fn get_database_url(config: &AppConfig) -> String {
    config.database_url.clone().unwrap_or_else(|| {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
    })
}

/// Establishes a connection to the `SQLite` database.
pub async fn create_connection(config: &AppConfig) -> Result<DatabaseConnection> {
    let database_url = get_database_url(config);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation
/// from entity definitions, plus the unique index that backs account lookup.
///
/// Statements are built with `if_not_exists` so startup is idempotent against
/// an existing database file. The `(guild_id, user_id)` index is what makes
/// one account row per member a database guarantee rather than a convention;
/// concurrent first-reference writers surface as a unique-constraint error
/// instead of a duplicated row.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut account_table = schema.create_table_from_entity(Account);
    let mut request_table = schema.create_table_from_entity(Request);
    let mut ledger_entry_table = schema.create_table_from_entity(LedgerEntry);
    let mut guild_config_table = schema.create_table_from_entity(GuildConfig);

    db.execute(builder.build(account_table.if_not_exists()))
        .await?;
    db.execute(builder.build(request_table.if_not_exists()))
        .await?;
    db.execute(builder.build(ledger_entry_table.if_not_exists()))
        .await?;
    db.execute(builder.build(guild_config_table.if_not_exists()))
        .await?;

    db.execute(
        builder.build(
            Index::create()
                .name("idx_accounts_guild_user")
                .table(Account)
                .col(AccountColumn::GuildId)
                .col(AccountColumn::UserId)
                .unique()
                .if_not_exists(),
        ),
    )
    .await?;

    Ok(())
}
