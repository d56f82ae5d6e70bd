pub mod commands;
pub mod config;
pub mod data;
pub mod handlers;
pub mod ledger;
pub mod logging;

pub const BOT_NAME: &str = "infraction_ledger";
pub const COMMAND_TARGET: &str = "infraction_ledger::command";
pub const ERROR_TARGET: &str = "infraction_ledger::error";
pub const EVENT_TARGET: &str = "infraction_ledger::handlers";
pub const LEDGER_TARGET: &str = "infraction_ledger::ledger";
pub const CONVERSATION_TARGET: &str = "infraction_ledger::conversation";
pub const CONSOLE_TARGET: &str = "infraction_ledger";

pub use config::BotConfig;
pub use data::{Data, DataInner};
pub use ledger::{InfractionLedger, LedgerError, WarningRecord};
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
