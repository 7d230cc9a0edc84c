//! Sync configuration.
//!
//! Values are layered, lowest precedence first:
//! 1. `~/.config/staysync/config.toml`
//! 2. legacy environment variables (`GOOGLE_CALENDAR_ICAL_URL`, `NOTION_TOKEN`,
//!    `NOTION_GUEST_STAYS_DB_ID`, `NOTION_GUEST_DB_ID`)
//! 3. `STAYSYNC_*` environment variables (e.g. `STAYSYNC_LOOKBACK_DAYS`)

use std::collections::HashMap;
use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{StaySyncError, StaySyncResult};
use crate::matching::MatchPolicyKind;

const ENV_PREFIX: &str = "STAYSYNC";

/// Legacy variable name → config key
const LEGACY_ENV: [(&str, &str); 4] = [
    ("GOOGLE_CALENDAR_ICAL_URL", "feed_url"),
    ("NOTION_TOKEN", "notion_token"),
    ("NOTION_GUEST_STAYS_DB_ID", "stays_database_id"),
    ("NOTION_GUEST_DB_ID", "guests_database_id"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// iCalendar feed location (https:// or webcal://)
    pub feed_url: Option<String>,
    pub notion_token: Option<String>,
    /// Destination collection holding stays
    pub stays_database_id: Option<String>,
    /// Destination collection holding guests
    pub guests_database_id: Option<String>,
    /// Only consider events starting in the last N days. Unset means the whole feed.
    pub lookback_days: Option<u32>,
    #[serde(default)]
    pub match_policy: MatchPolicyKind,
}

impl SyncConfig {
    pub fn config_path() -> StaySyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| StaySyncError::Config("Could not determine config directory".into()))?
            .join("staysync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the config file and the process environment.
    pub fn load() -> StaySyncResult<Self> {
        let config_path = Self::config_path()?;
        let file_contents = if config_path.exists() {
            Some(std::fs::read_to_string(&config_path)?)
        } else {
            None
        };
        let env: HashMap<String, String> = std::env::vars().collect();

        Self::from_sources(file_contents.as_deref(), &env)
    }

    /// Build the layered config from TOML file contents and an environment map.
    pub fn from_sources(
        file_contents: Option<&str>,
        env: &HashMap<String, String>,
    ) -> StaySyncResult<Self> {
        let legacy: config::Map<String, String> = LEGACY_ENV
            .iter()
            .filter_map(|(var, key)| {
                env.get(*var)
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (key.to_uppercase(), v.clone()))
            })
            .collect();

        let prefixed: config::Map<String, String> = env
            .iter()
            .filter(|(k, _)| k.starts_with(&format!("{ENV_PREFIX}_")))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut builder = Config::builder();
        if let Some(contents) = file_contents {
            builder = builder.add_source(File::from_str(contents, FileFormat::Toml));
        }

        builder
            .add_source(Environment::default().source(Some(legacy)).try_parsing(true))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .source(Some(prefixed))
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| StaySyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| StaySyncError::Config(e.to_string()))
    }

    pub fn feed_url(&self) -> StaySyncResult<&str> {
        required(self.feed_url.as_deref(), "feed_url", "GOOGLE_CALENDAR_ICAL_URL")
    }

    pub fn notion_token(&self) -> StaySyncResult<&str> {
        required(self.notion_token.as_deref(), "notion_token", "NOTION_TOKEN")
    }

    pub fn stays_database_id(&self) -> StaySyncResult<&str> {
        required(
            self.stays_database_id.as_deref(),
            "stays_database_id",
            "NOTION_GUEST_STAYS_DB_ID",
        )
    }

    pub fn guests_database_id(&self) -> StaySyncResult<&str> {
        required(
            self.guests_database_id.as_deref(),
            "guests_database_id",
            "NOTION_GUEST_DB_ID",
        )
    }

    /// Check every required value before any network call is made.
    pub fn validate(&self) -> StaySyncResult<()> {
        self.feed_url()?;
        self.notion_token()?;
        self.stays_database_id()?;
        self.guests_database_id()?;
        Ok(())
    }

    /// Copy safe to print: the token is masked.
    pub fn redacted(&self) -> Self {
        SyncConfig {
            notion_token: self.notion_token.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }
}

fn required<'a>(value: Option<&'a str>, key: &str, legacy_var: &str) -> StaySyncResult<&'a str> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        StaySyncError::Config(format!(
            "{key} is not set. Add it to config.toml or set {legacy_var} / {ENV_PREFIX}_{}",
            key.to_uppercase()
        ))
    })
}
