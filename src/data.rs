use std::{ops::Deref, sync::Arc};

use crate::config::BotConfig;
use crate::ledger::{
    GuildKey, InfractionLedger, LedgerResult, MemberKey, ModeratorKey, WarningRecord,
};
use tokio::task::{JoinError, spawn_blocking};

/// Centralized data structure for the bot, shared with every command
#[derive(Clone, Debug)]
pub struct Data(pub Arc<DataInner>);

impl Deref for Data {
    type Target = DataInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Data {
    /// Wrap an already opened ledger
    #[must_use]
    pub fn new(ledger: InfractionLedger) -> Self {
        Self(Arc::new(DataInner { ledger }))
    }

    /// Open the ledger named by the configuration
    ///
    /// # Errors
    /// Fails if the ledger file exists but cannot be read or parsed.
    pub fn load(config: &BotConfig) -> LedgerResult<Self> {
        InfractionLedger::open_yaml(&config.ledger_path).map(Self::new)
    }

    /// Record a warning from async code
    ///
    /// The ledger flushes to disk under its lock, so the call runs on the
    /// blocking pool instead of an executor thread.
    ///
    /// # Errors
    /// The outer error is only returned if the blocking task panicked.
    pub async fn record_warning(
        &self,
        guild: impl Into<GuildKey>,
        member: impl Into<MemberKey>,
        reason: impl Into<String>,
        moderator: impl Into<ModeratorKey>,
    ) -> Result<LedgerResult<()>, JoinError> {
        let (guild, member, reason, moderator) =
            (guild.into(), member.into(), reason.into(), moderator.into());
        let data = self.clone();
        spawn_blocking(move || data.ledger.record_warning(guild, member, reason, moderator)).await
    }

    /// Fetch a member's warnings from async code, off the executor threads
    ///
    /// # Errors
    /// Only returned if the blocking task panicked.
    pub async fn warnings(
        &self,
        guild: impl Into<GuildKey>,
        member: impl Into<MemberKey>,
    ) -> Result<Vec<WarningRecord>, JoinError> {
        let (guild, member) = (guild.into(), member.into());
        let data = self.clone();
        spawn_blocking(move || data.ledger.get_warnings(&guild, &member)).await
    }
}

/// Main centralized data structure for the bot
#[derive(Debug)]
pub struct DataInner {
    /// Warning history of every guild
    pub ledger: InfractionLedger,
}
