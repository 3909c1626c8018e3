//! Discord event handlers.

/// Reaction-based approval signal handling
pub mod reactions;
