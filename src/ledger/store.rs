//! Infraction ledger
//!
//! The ledger owns the in-memory state and the storage backend. Every append
//! runs its read-modify-persist sequence under the write guard, and the new
//! state only replaces the old one once the backend has flushed it.

use crate::LEDGER_TARGET;
use crate::ledger::{
    GuildKey, LedgerResult, LedgerState, MemberKey, ModeratorKey, WarningRecord, WarningStorage,
    YamlFileStorage,
};
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info};

/// Durable per-guild, per-member warning history
pub struct InfractionLedger {
    storage: Box<dyn WarningStorage>,
    state: RwLock<LedgerState>,
}

impl std::fmt::Debug for InfractionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("InfractionLedger")
            .field("guilds", &state.guild_count())
            .field("warnings", &state.total_warnings())
            .finish_non_exhaustive()
    }
}

impl InfractionLedger {
    /// Load the ledger from `storage`
    ///
    /// # Errors
    ///
    /// Returns a storage failure if the backend cannot be read or holds a
    /// corrupt ledger. Corruption is never treated as an empty store.
    pub fn open(storage: impl WarningStorage + 'static) -> LedgerResult<Self> {
        let state = storage.load()?;
        info!(
            target: LEDGER_TARGET,
            guilds = state.guild_count(),
            warnings = state.total_warnings(),
            "Infraction ledger loaded"
        );
        Ok(Self {
            storage: Box::new(storage),
            state: RwLock::new(state),
        })
    }

    /// Load the ledger from a YAML file, starting empty if it does not exist yet
    ///
    /// # Errors
    ///
    /// See [`InfractionLedger::open`].
    pub fn open_yaml(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        Self::open(YamlFileStorage::new(path))
    }

    // The state is only ever replaced wholesale after a successful flush, so a
    // guard poisoned by a panicking holder still points at consistent data.
    fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a warning for `member` in `guild` and flush it to storage
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if an identifier is blank or malformed, or the reason is blank.
    /// - `StorageFailure` if the flush fails; the ledger is left unchanged.
    pub fn record_warning(
        &self,
        guild: impl Into<GuildKey>,
        member: impl Into<MemberKey>,
        reason: impl Into<String>,
        moderator: impl Into<ModeratorKey>,
    ) -> LedgerResult<()> {
        let guild = guild.into();
        let member = member.into();
        let record = WarningRecord::new(reason, moderator);

        guild.validate()?;
        member.validate()?;
        record.validate()?;

        let moderator_id = record.moderator_id.clone();
        let mut state = self.write_state();
        let mut next = state.clone();
        let count = next.append(guild.clone(), member.clone(), record);

        if let Err(err) = self.storage.persist(&next) {
            error!(
                target: LEDGER_TARGET,
                guild_id = %guild,
                member_id = %member,
                error = %err,
                "Failed to persist warning, ledger left unchanged"
            );
            return Err(err);
        }
        *state = next;
        drop(state);

        info!(
            target: LEDGER_TARGET,
            guild_id = %guild,
            member_id = %member,
            moderator_id = %moderator_id,
            warning_count = count,
            "Warning recorded"
        );
        Ok(())
    }

    /// Full warning history of `member` in `guild`, oldest first
    ///
    /// Members that were never warned have an empty history.
    #[must_use]
    pub fn get_warnings(&self, guild: &GuildKey, member: &MemberKey) -> Vec<WarningRecord> {
        self.read_state().warnings(guild, member).to_vec()
    }

    /// Number of warnings `member` has in `guild`
    #[must_use]
    pub fn warning_count(&self, guild: &GuildKey, member: &MemberKey) -> usize {
        self.read_state().warnings(guild, member).len()
    }

    /// Copy of the whole ledger
    #[must_use]
    pub fn snapshot(&self) -> LedgerState {
        self.read_state().clone()
    }
}
