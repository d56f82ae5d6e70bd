use crate::logging::LOG_DIR;
use std::path::PathBuf;
use thiserror::Error;

/// Default location of the infraction ledger
pub const LEDGER_FILE: &str = "data/infractions.yaml";

/// Errors raised while reading the bot configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DISCORD_TOKEN must be set")]
    MissingToken,
}

/// Runtime configuration, read from the environment
#[derive(Clone)]
pub struct BotConfig {
    /// Discord bot token
    pub token: String,
    /// Where the infraction ledger is stored
    pub ledger_path: PathBuf,
    /// Directory for the rolling log files
    pub log_dir: PathBuf,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("ledger_path", &self.ledger_path)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from the process environment, after reading `.env` if present
    ///
    /// # Errors
    /// Returns `ConfigError::MissingToken` if `DISCORD_TOKEN` is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine, real deployments set the variables directly
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns `ConfigError::MissingToken` if `DISCORD_TOKEN` is unset or empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token = non_empty("DISCORD_TOKEN").ok_or(ConfigError::MissingToken)?;
        let ledger_path = non_empty("INFRACTIONS_FILE").unwrap_or_else(|| LEDGER_FILE.to_string());
        let log_dir = non_empty("LOG_DIR").unwrap_or_else(|| LOG_DIR.to_string());

        Ok(Self {
            token,
            ledger_path: ledger_path.into(),
            log_dir: log_dir.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup_from(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.ledger_path, PathBuf::from(LEDGER_FILE));
        assert_eq!(config.log_dir, PathBuf::from(LOG_DIR));
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("INFRACTIONS_FILE", "/var/lib/bot/infractions.yaml"),
            ("LOG_DIR", "/var/log/bot"),
        ]))
        .unwrap();
        assert_eq!(config.ledger_path, PathBuf::from("/var/lib/bot/infractions.yaml"));
        assert_eq!(config.log_dir, PathBuf::from("/var/log/bot"));
    }

    #[test]
    fn test_missing_or_blank_token() {
        let err = BotConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err.to_string(), "DISCORD_TOKEN must be set");

        assert!(BotConfig::from_lookup(lookup_from(&[("DISCORD_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = BotConfig::from_lookup(lookup_from(&[("DISCORD_TOKEN", "secret")])).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("secret"));
        assert!(debug_output.contains("<redacted>"));
    }
}
