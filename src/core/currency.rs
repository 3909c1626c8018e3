//! Copper amount formatting and parsing.
//!
//! All balances and amounts are `i64` copper minor units: 1 gold = 10000
//! copper, 1 silver = 100 copper. Rendering splits a copper value into the
//! three denominations with per-guild symbol overrides; parsing accepts
//! either a bare copper integer or a denominated string like `"1g2s3c"`.
//! Earlier revisions of the bot each parsed denominated amounts their own
//! way; this codec is the single replacement for that drift.

use crate::config::settings::CurrencyConfig;
use crate::entities::GuildConfigModel;
use crate::errors::{Error, Result};

/// Copper per silver piece.
pub const COPPER_PER_SILVER: i64 = 100;
/// Copper per gold piece.
pub const COPPER_PER_GOLD: i64 = 10_000;

/// Resolved display symbols for the three denominations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencySymbols {
    /// Gold suffix
    pub gold: String,
    /// Silver suffix
    pub silver: String,
    /// Copper suffix
    pub copper: String,
}

impl CurrencySymbols {
    /// Resolves symbols for a guild: guild overrides first, application
    /// defaults for anything unset.
    pub fn resolve(guild_config: Option<&GuildConfigModel>, defaults: &CurrencyConfig) -> Self {
        let pick = |over: Option<&String>, default: &str| {
            over.cloned().unwrap_or_else(|| default.to_string())
        };
        Self {
            gold: pick(
                guild_config.and_then(|c| c.gold_symbol.as_ref()),
                &defaults.gold_symbol,
            ),
            silver: pick(
                guild_config.and_then(|c| c.silver_symbol.as_ref()),
                &defaults.silver_symbol,
            ),
            copper: pick(
                guild_config.and_then(|c| c.copper_symbol.as_ref()),
                &defaults.copper_symbol,
            ),
        }
    }
}

impl From<&CurrencyConfig> for CurrencySymbols {
    fn from(defaults: &CurrencyConfig) -> Self {
        Self::resolve(None, defaults)
    }
}

/// Renders a copper amount as `"{gold}g{silver:02}s{copper:02}c"` with the
/// given symbols. Silver and copper are always two digits so amounts line up
/// in lists.
pub fn format_copper(amount: i64, symbols: &CurrencySymbols) -> String {
    let gold = amount / COPPER_PER_GOLD;
    let silver = (amount % COPPER_PER_GOLD) / COPPER_PER_SILVER;
    let copper = amount % COPPER_PER_SILVER;
    format!(
        "{gold}{}{silver:02}{}{copper:02}{}",
        symbols.gold, symbols.silver, symbols.copper
    )
}

/// Parses a user-supplied amount into positive copper.
///
/// Accepts a bare integer (`"15000"`, taken as copper) or a denominated
/// string (`"1g50s"`, `"3c"`, case-insensitive, units in any order but each
/// at most once). Rejects empty, zero, negative, malformed, and overflowing
/// inputs with [`Error::InvalidAmount`].
pub fn parse_amount(input: &str) -> Result<i64> {
    let invalid = || Error::InvalidAmount {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let value: i64 = trimmed.parse().map_err(|_| invalid())?;
        if value <= 0 {
            return Err(invalid());
        }
        return Ok(value);
    }

    let mut total: i64 = 0;
    let mut seen = [false; 3];
    let mut digits = String::new();
    for ch in trimmed.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let (slot, unit_value) = match ch.to_ascii_lowercase() {
            'g' => (0, COPPER_PER_GOLD),
            's' => (1, COPPER_PER_SILVER),
            'c' => (2, 1),
            _ => return Err(invalid()),
        };
        if digits.is_empty() || seen[slot] {
            return Err(invalid());
        }
        seen[slot] = true;
        let value: i64 = digits.parse().map_err(|_| invalid())?;
        digits.clear();
        total = value
            .checked_mul(unit_value)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(invalid)?;
    }

    // Trailing digits without a unit suffix
    if !digits.is_empty() {
        return Err(invalid());
    }
    if total <= 0 {
        return Err(invalid());
    }
    Ok(total)
}
