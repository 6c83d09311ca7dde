//! Settings
//!
//! Layered configuration: built-in defaults, then a TOML file, then
//! `GMKIT_`-prefixed environment variables (`__` separates sections, e.g.
//! `GMKIT_TRACKER__DUPLICATE_INITIATIVE=reject`).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::combat::{DuplicatePolicy, InitiativeTracker, Participant};

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "gmkit.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "GMKIT_";

/// Log filter used when neither RUST_LOG nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "gmkit=info";

/// Initiative tracker settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// `defer` (fail when the cursor reaches a shared score) or `reject`
    /// (fail when the duplicate is added)
    pub duplicate_initiative: DuplicatePolicy,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directive
    pub filter: String,
    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}

/// All settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tracker: TrackerSettings,
    #[serde(default)]
    pub log: LogSettings,
}

impl Settings {
    /// Provider chain: defaults, TOML file (missing files are skipped), env
    pub fn figment(path: Option<&Path>) -> Figment {
        let path: PathBuf = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load settings from the default chain.
    ///
    /// Only the implicit `gmkit.toml` may be absent; a path given explicitly
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        if let Some(path) = path.filter(|p| !p.is_file()) {
            return Err(format!("config file {} not found", path.display()).into());
        }
        Self::figment(path).extract()
    }

    /// Set the duplicate initiative policy
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.tracker.duplicate_initiative = policy;
        self
    }

    /// An empty tracker configured from these settings
    pub fn tracker<C: Participant>(&self) -> InitiativeTracker<C> {
        InitiativeTracker::with_policy(self.tracker.duplicate_initiative)
    }
}
