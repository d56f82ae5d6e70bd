//! Warning records, identifier keys and the nested ledger state
//!
//! Identifiers arrive as numeric snowflakes at the Discord boundary but are kept
//! as opaque text so the on-disk layout stays stable and keys never collide
//! across types.

use crate::ledger::{LedgerError, LedgerResult};
use derive_more::{Display, From};
use poise::serenity_prelude::{GuildId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn validate_identifier(label: &str, value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::invalid(format!("{label} must not be empty")));
    }
    if value.chars().any(char::is_control) {
        return Err(LedgerError::invalid(format!(
            "{label} contains control characters"
        )));
    }
    Ok(())
}

macro_rules! opaque_key {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Borrow the identifier as text
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub(crate) fn validate(&self) -> LedgerResult<()> {
                validate_identifier($label, &self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value.to_string())
            }
        }
    };
}

opaque_key!(
    /// Key of a guild in the ledger
    GuildKey,
    "guild id"
);

opaque_key!(
    /// Key of a warned member within a guild
    MemberKey,
    "member id"
);

opaque_key!(
    /// Identifier of the moderator who issued a warning
    ModeratorKey,
    "moderator id"
);

impl From<GuildId> for GuildKey {
    fn from(id: GuildId) -> Self {
        Self::from(id.get())
    }
}

impl From<UserId> for MemberKey {
    fn from(id: UserId) -> Self {
        Self::from(id.get())
    }
}

impl From<UserId> for ModeratorKey {
    fn from(id: UserId) -> Self {
        Self::from(id.get())
    }
}

impl ModeratorKey {
    /// Resolve the key back to a Discord user, if it holds a snowflake
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.0
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .map(UserId::new)
    }
}

/// A single warning issued to a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRecord {
    /// Free-form reason supplied by the moderator
    pub reason: String,
    /// Who issued the warning
    #[serde(rename = "moderator")]
    pub moderator_id: ModeratorKey,
}

impl WarningRecord {
    pub fn new(reason: impl Into<String>, moderator_id: impl Into<ModeratorKey>) -> Self {
        Self {
            reason: reason.into(),
            moderator_id: moderator_id.into(),
        }
    }

    /// Reject blank reasons and malformed moderator ids
    pub(crate) fn validate(&self) -> LedgerResult<()> {
        if self.reason.trim().is_empty() {
            return Err(LedgerError::invalid("reason must not be empty"));
        }
        self.moderator_id.validate()
    }
}

/// Warning history of every member in one guild
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildLedger {
    members: BTreeMap<MemberKey, Vec<WarningRecord>>,
}

impl GuildLedger {
    /// Warnings for a member, oldest first
    #[must_use]
    pub fn warnings(&self, member: &MemberKey) -> &[WarningRecord] {
        self.members.get(member).map_or(&[], Vec::as_slice)
    }

    /// Number of members with at least one warning
    #[must_use]
    pub fn warned_member_count(&self) -> usize {
        self.members.values().filter(|w| !w.is_empty()).count()
    }
}

/// The whole ledger: guild -> member -> ordered warnings
///
/// This is the exact shape written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerState {
    guilds: BTreeMap<GuildKey, GuildLedger>,
}

impl LedgerState {
    /// Append a warning, creating the guild and member entries if absent
    pub fn append(&mut self, guild: GuildKey, member: MemberKey, record: WarningRecord) -> usize {
        let history = self
            .guilds
            .entry(guild)
            .or_default()
            .members
            .entry(member)
            .or_default();
        history.push(record);
        history.len()
    }

    /// Warnings for a member in a guild; empty when either key is unknown
    #[must_use]
    pub fn warnings(&self, guild: &GuildKey, member: &MemberKey) -> &[WarningRecord] {
        self.guilds
            .get(guild)
            .map_or(&[], |ledger| ledger.warnings(member))
    }

    /// Ledger of a single guild
    #[must_use]
    pub fn guild(&self, guild: &GuildKey) -> Option<&GuildLedger> {
        self.guilds.get(guild)
    }

    /// Number of guilds with stored history
    #[must_use]
    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Total number of warnings across all guilds
    #[must_use]
    pub fn total_warnings(&self) -> usize {
        self.guilds
            .values()
            .flat_map(|ledger| ledger.members.values())
            .map(Vec::len)
            .sum()
    }
}
