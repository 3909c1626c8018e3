//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod guild_config;
pub mod ledger_entry;
pub mod request;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use guild_config::{
    Column as GuildConfigColumn, Entity as GuildConfig, Model as GuildConfigModel,
};
pub use ledger_entry::{
    Column as LedgerEntryColumn, Entity as LedgerEntry, Model as LedgerEntryModel,
};
pub use request::{Column as RequestColumn, Entity as Request, Model as RequestModel};
