//! Runtime configuration.
//!
//! Loaded from a TOML file with `GUILDLINK_*` environment overrides for the
//! values that are secrets or deployment-specific.

use crate::error::RuntimeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    pub database: DatabaseConfig,
    pub roster: RosterConfig,
    pub schedule: ScheduleConfig,
    pub moderation: ModerationConfig,
    pub intake: IntakeConfig,
    pub interaction: InteractionConfig,
    pub crosscheck: CrosscheckSettings,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file path.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "guildlink.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RosterConfig {
    /// Roster API root.
    pub base_url: String,
    /// Selects the community's roster.
    pub community_id: String,
    /// Bearer credential for the roster API.
    pub bearer_token: String,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Hour (UTC) of the daily reconciliation run.
    pub daily_hour_utc: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { daily_hour_utc: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Warnings older than this are purged on the next add.
    pub warning_retention_days: i64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            warning_retention_days: 90,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Eviction window for abandoned stage-one submissions.
    pub staging_ttl_secs: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            staging_ttl_secs: 15 * 60,
        }
    }
}

/// Windows for workflow steps that wait on further human input. The
/// presentation layer enforces them; expiry cancels with zero mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Selecting an application id or a warning ordinal.
    pub selection_timeout_secs: u64,
    /// Confirming that an invite is wanted.
    pub invite_confirm_timeout_secs: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            selection_timeout_secs: 30,
            invite_confirm_timeout_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosscheckSettings {
    pub excluded_ranks: Vec<String>,
    pub page_size: usize,
}

impl Default for CrosscheckSettings {
    fn default() -> Self {
        Self {
            excluded_ranks: vec!["Legacy Member".to_string()],
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl RuntimeConfig {
    /// Load from a TOML file (defaults when absent), then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, RuntimeError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|e| RuntimeError::Config(e.to_string()))?;
                toml::from_str(&contents).map_err(|e| RuntimeError::Config(e.to_string()))?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("GUILDLINK_DB_PATH") {
            self.database.path = value;
        }
        if let Ok(value) = std::env::var("GUILDLINK_ROSTER_URL") {
            self.roster.base_url = value;
        }
        if let Ok(value) = std::env::var("GUILDLINK_COMMUNITY_ID") {
            self.roster.community_id = value;
        }
        if let Ok(value) = std::env::var("GUILDLINK_ROSTER_TOKEN") {
            self.roster.bearer_token = value;
        }
        if let Ok(value) = std::env::var("GUILDLINK_LOG_LEVEL") {
            self.log.level = value;
        }
    }

    /// The roster client cannot be built without these.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        for (value, name) in [
            (&self.roster.base_url, "roster.base_url"),
            (&self.roster.community_id, "roster.community_id"),
            (&self.roster.bearer_token, "roster.bearer_token"),
        ] {
            if value.trim().is_empty() {
                return Err(RuntimeError::Config(format!("{name} is required")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.schedule.daily_hour_utc, 1);
        assert_eq!(config.moderation.warning_retention_days, 90);
        assert_eq!(config.crosscheck.excluded_ranks, vec!["Legacy Member"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let config = RuntimeConfig::load(Some(Path::new("/nonexistent/guildlink.toml"))).unwrap();
        assert_eq!(config.database.path, "guildlink.db");
    }

    #[test]
    fn test_partial_toml_overlays_defaults() {
        let parsed: RuntimeConfig = toml::from_str(
            r#"
            [roster]
            base_url = "https://api.example.com/v2"
            community_id = "C-1"
            bearer_token = "secret"

            [schedule]
            daily_hour_utc = 4
            "#,
        )
        .unwrap();
        assert_eq!(parsed.schedule.daily_hour_utc, 4);
        assert_eq!(parsed.intake.staging_ttl_secs, 900);
        assert!(parsed.validate().is_ok());
    }
}
