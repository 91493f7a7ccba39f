// Host daemon configuration: `<base>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for the host daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    /// Account name of the one application allowed on the channel.
    pub client_app: String,
    /// Canonical location of the persisted config document.
    pub config_path: PathBuf,
    /// Location the pre-bridge install kept its document at; source
    /// for the one-shot migration.
    pub legacy_config_path: PathBuf,
    /// Serve channel traffic to any caller. Defaults on only in debug
    /// builds; never enable on a production host.
    pub allow_all_callers: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            client_app: "privbridge-client".into(),
            config_path: "/var/lib/privbridge/config.json".into(),
            legacy_config_path: "/var/lib/privbridge-old/config.json".into(),
            allow_all_callers: cfg!(debug_assertions),
        }
    }
}

impl HostConfig {
    /// Load from `<base>/config.toml`. Returns defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load(base_dir: &Path) -> Self {
        Self::load_from(&base_dir.join("config.toml")).unwrap_or_default()
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Serialize(e) => write!(f, "config serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
