//! Infraction ledger for the moderation bot
//!
//! This module keeps the durable warning history: guild -> member -> ordered
//! warnings, flushed to disk on every append.

mod error;
mod record;
mod storage;
mod store;

pub use error::{LedgerError, LedgerResult, StorageError};
pub use record::{GuildKey, GuildLedger, LedgerState, MemberKey, ModeratorKey, WarningRecord};
pub use storage::{WarningStorage, YamlFileStorage};
pub use store::InfractionLedger;
