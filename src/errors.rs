//! Unified error types for `GuildCoffer`.
//!
//! Submission-time validation errors (`InvalidAmount`) are returned
//! synchronously to the submitter. Failures discovered during asynchronous
//! approval (an under-funded transfer, say) are not errors at all: they
//! travel as approval outcomes and surface through the outcome notification.
//! Nothing in this subsystem is fatal: the poise `on_error` hook logs
//! command failures and picks user-facing phrasing.

use thiserror::Error;

/// All error conditions the bot can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or validation failed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong
        message: String,
    },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Required environment variable missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// JSON snapshot encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Amount was non-positive, malformed, or out of range
    #[error("Invalid amount: {input:?}")]
    InvalidAmount {
        /// The rejected input as the user supplied it
        input: String,
    },

    /// No request exists with the given id
    #[error("Request {id} not found")]
    RequestNotFound {
        /// The unknown request id
        id: i64,
    },

    /// The request already reached a terminal status
    #[error("Request {id} is already resolved")]
    AlreadyResolved {
        /// The id of the resolved request
        id: i64,
    },

    /// Actor lacks the guild's configured admin role
    #[error("Not authorized for this operation")]
    Unauthorized,

    /// Serenity/Poise framework error
    #[error("Framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
