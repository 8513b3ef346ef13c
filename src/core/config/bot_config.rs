// Runtime configuration, read from the environment (a .env file is loaded first
// by the binary). Everything the composition root needs lives in one struct so
// main.rs doesn't sprinkle env lookups around.

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MODULES_DIR: &str = "demo_bot";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable! Create a .env file with your bot settings.")]
    Missing(&'static str),

    #[error("{name} must be a non-zero Discord snowflake, got `{value}`")]
    InvalidId { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub application_id: u64,
    /// Root of the module tree handed to discovery.
    pub modules_dir: PathBuf,
    /// When set, commands are published to this guild only (instant propagation while developing).
    pub dev_guild_id: Option<u64>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let application_id = lookup("DISCORD_APPLICATION_ID")
            .ok_or(ConfigError::Missing("DISCORD_APPLICATION_ID"))
            .and_then(|raw| parse_snowflake("DISCORD_APPLICATION_ID", &raw))?;

        let modules_dir = lookup("BOT_MODULES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODULES_DIR));

        let dev_guild_id = match lookup("DISCORD_DEV_GUILD_ID") {
            Some(raw) if !raw.trim().is_empty() => {
                Some(parse_snowflake("DISCORD_DEV_GUILD_ID", &raw)?)
            }
            _ => None,
        };

        Ok(Self {
            token,
            application_id,
            modules_dir,
            dev_guild_id,
        })
    }
}

fn parse_snowflake(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(ConfigError::InvalidId {
            name,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_APPLICATION_ID", "1234"),
        ]))
        .unwrap();

        assert_eq!(config.token, "abc");
        assert_eq!(config.application_id, 1234);
        assert_eq!(config.modules_dir, PathBuf::from(DEFAULT_MODULES_DIR));
        assert_eq!(config.dev_guild_id, None);
    }

    #[test]
    fn test_missing_token_is_reported() {
        let err = BotConfig::from_lookup(lookup_from(&[("DISCORD_APPLICATION_ID", "1")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISCORD_TOKEN"));
    }

    #[test]
    fn test_zero_application_id_is_rejected() {
        let err = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_APPLICATION_ID", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidId { name: "DISCORD_APPLICATION_ID", .. }));
    }

    #[test]
    fn test_dev_guild_and_modules_dir_overrides() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_APPLICATION_ID", "1234"),
            ("BOT_MODULES_DIR", "/srv/bot"),
            ("DISCORD_DEV_GUILD_ID", "1432001978447167611"),
        ]))
        .unwrap();

        assert_eq!(config.modules_dir, PathBuf::from("/srv/bot"));
        assert_eq!(config.dev_guild_id, Some(1432001978447167611));
    }
}
