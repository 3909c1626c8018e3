//! Per-guild configuration access.
//!
//! One row per guild, written by `/setup` and read everywhere else. The
//! approval workflow and direct admin commands both gate on
//! `admin_role_id`; a guild with no row cannot approve anything.

use crate::entities::{GuildConfig, guild_config};
use crate::errors::Result;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait};

/// Fetches a guild's configuration, `None` if `/setup` has not run.
pub async fn get_config<C: ConnectionTrait>(
    db: &C,
    guild_id: &str,
) -> Result<Option<guild_config::Model>> {
    GuildConfig::find_by_id(guild_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Arguments for creating or updating a guild configuration.
#[derive(Debug, Clone)]
pub struct ConfigUpdate {
    /// Guild the configuration applies to
    pub guild_id: String,
    /// Role whose holders may approve requests and run admin commands
    pub admin_role_id: String,
    /// Channel approval embeds are posted to
    pub request_channel_id: Option<String>,
    /// Gold display override
    pub gold_symbol: Option<String>,
    /// Silver display override
    pub silver_symbol: Option<String>,
    /// Copper display override
    pub copper_symbol: Option<String>,
}

/// Creates or replaces a guild's configuration row.
pub async fn upsert_config<C: ConnectionTrait>(
    db: &C,
    update: ConfigUpdate,
) -> Result<guild_config::Model> {
    let existing = get_config(db, &update.guild_id).await?;

    let model = guild_config::ActiveModel {
        guild_id: Set(update.guild_id),
        admin_role_id: Set(update.admin_role_id),
        request_channel_id: Set(update.request_channel_id),
        gold_symbol: Set(update.gold_symbol),
        silver_symbol: Set(update.silver_symbol),
        copper_symbol: Set(update.copper_symbol),
    };

    let result = if existing.is_some() {
        model.update(db).await?
    } else {
        model.insert(db).await?
    };
    Ok(result)
}

/// True when the actor's role list contains the guild's configured admin role.
pub fn is_authorized(config: &guild_config::Model, actor_roles: &[String]) -> bool {
    actor_roles.iter().any(|r| *r == config.admin_role_id)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_upsert_then_get_round_trips() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;

        let created = upsert_config(
            &db,
            ConfigUpdate {
                guild_id: "guild-1".to_string(),
                admin_role_id: "role-1".to_string(),
                request_channel_id: Some("chan-1".to_string()),
                gold_symbol: None,
                silver_symbol: None,
                copper_symbol: None,
            },
        )
        .await?;
        assert_eq!(created.admin_role_id, "role-1");

        // Second upsert replaces, not duplicates
        let updated = upsert_config(
            &db,
            ConfigUpdate {
                guild_id: "guild-1".to_string(),
                admin_role_id: "role-2".to_string(),
                request_channel_id: None,
                gold_symbol: Some("G".to_string()),
                silver_symbol: None,
                copper_symbol: None,
            },
        )
        .await?;
        assert_eq!(updated.admin_role_id, "role-2");

        let fetched = get_config(&db, "guild-1").await?.unwrap();
        assert_eq!(fetched.admin_role_id, "role-2");
        assert_eq!(fetched.gold_symbol.as_deref(), Some("G"));
        assert_eq!(fetched.request_channel_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_guild_has_no_config() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        assert!(get_config(&db, "nowhere").await?.is_none());
        Ok(())
    }

    #[test]
    fn test_is_authorized_matches_role_id() {
        let config = guild_config::Model {
            guild_id: "g".to_string(),
            admin_role_id: "banker".to_string(),
            request_channel_id: None,
            gold_symbol: None,
            silver_symbol: None,
            copper_symbol: None,
        };
        assert!(is_authorized(
            &config,
            &["member".to_string(), "banker".to_string()]
        ));
        assert!(!is_authorized(&config, &["member".to_string()]));
        assert!(!is_authorized(&config, &[]));
    }
}
