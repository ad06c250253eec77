//! Configuration for the localization engine.
//!
//! The configuration follows XDG Base Directory Specification and supports:
//! - User config: `~/.config/lingua/i18n.yaml`
//! - Project config: `.lingua.yaml` in current directory
//! - Environment variables: `LINGUA_*`
//! - Explicit values set by the host (highest precedence)

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::locale::{AliasTable, LocaleId, Normalizer};
use crate::persistence::DEFAULT_PERSISTENCE_KEY;

/// Directory name used under the config and state roots.
const APP_DIR: &str = "lingua";

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Locale used when negotiation has nothing else to go on.
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Key the session's locale choice is persisted under.
    #[serde(default = "default_persistence_key")]
    pub persistence_key: String,

    /// Directory of `<locale>.json` translation tables registered at startup.
    #[serde(default)]
    pub locales_dir: Option<PathBuf>,

    /// Extra locale aliases layered over the built-in table.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_persistence_key() -> String {
    DEFAULT_PERSISTENCE_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            persistence_key: default_persistence_key(),
            locales_dir: None,
            aliases: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from all sources with proper precedence.
    ///
    /// Resolution order (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.lingua.yaml`)
    /// 3. User config (`~/.config/lingua/i18n.yaml`)
    /// 4. Defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::user_config_path()
            && path.exists()
        {
            config.merge(Self::load_from_file(&path)?);
        }

        let project_path = PathBuf::from(".lingua.yaml");
        if project_path.exists() {
            config.merge(Self::load_from_file(&project_path)?);
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            Error::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Merge another config into this one (other takes precedence).
    fn merge(&mut self, other: Self) {
        if other.default_locale != default_locale() {
            self.default_locale = other.default_locale;
        }

        if other.persistence_key != default_persistence_key() {
            self.persistence_key = other.persistence_key;
        }

        if other.locales_dir.is_some() {
            self.locales_dir = other.locales_dir;
        }

        self.aliases.extend(other.aliases);
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(locale) = std::env::var("LINGUA_DEFAULT_LOCALE")
            && !locale.trim().is_empty()
        {
            self.default_locale = locale;
        }

        if let Ok(key) = std::env::var("LINGUA_PERSISTENCE_KEY")
            && !key.trim().is_empty()
        {
            self.persistence_key = key;
        }

        if let Ok(dir) = std::env::var("LINGUA_LOCALES_DIR")
            && !dir.is_empty()
        {
            self.locales_dir = Some(PathBuf::from(dir));
        }
    }

    /// Check values that would otherwise only fail at first use.
    pub fn validate(&self) -> Result<()> {
        self.default_locale_id()?;
        if self.persistence_key.trim().is_empty() {
            return Err(Error::config("persistence_key must not be empty"));
        }
        for (from, to) in &self.aliases {
            if LocaleId::parse(to).is_none() {
                return Err(Error::config(format!("alias '{from}' targets invalid locale '{to}'")));
            }
        }
        Ok(())
    }

    /// The configured default locale, normalized.
    pub fn default_locale_id(&self) -> Result<LocaleId> {
        self.normalizer().parse(&self.default_locale).ok_or_else(|| {
            Error::config(format!("default_locale '{}' is not a valid locale", self.default_locale))
        })
    }

    /// A normalizer with the configured aliases applied.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(AliasTable::with_extra(
            self.aliases.iter().map(|(from, to)| (from.as_str(), to.as_str())),
        ))
    }

    /// Get the path to the user config file.
    ///
    /// Follows XDG Base Directory Specification:
    /// - Uses `XDG_CONFIG_HOME/lingua/i18n.yaml` if set
    /// - Falls back to `~/.config/lingua/i18n.yaml`
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("i18n.yaml"))
    }

    /// Get the path to the user config directory.
    ///
    /// Cross-platform behavior:
    /// - If `XDG_CONFIG_HOME` is set, uses `$XDG_CONFIG_HOME/lingua`
    /// - Linux/macOS: Falls back to `~/.config/lingua` (XDG default)
    /// - Windows: Falls back to `%APPDATA%\lingua`
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Some(PathBuf::from(xdg_config).join(APP_DIR));
        }

        #[cfg(windows)]
        {
            dirs::config_dir().map(|p| p.join(APP_DIR))
        }

        #[cfg(not(windows))]
        {
            dirs::home_dir().map(|p| p.join(".config").join(APP_DIR))
        }
    }

    /// Get the path to the state directory, where file-backed persistence
    /// keeps the chosen locale.
    ///
    /// Cross-platform behavior:
    /// - If `XDG_STATE_HOME` is set, uses `$XDG_STATE_HOME/lingua`
    /// - Linux/macOS: Falls back to `~/.local/state/lingua` (XDG default)
    /// - Windows: Falls back to `%LOCALAPPDATA%\lingua`
    #[must_use]
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME")
            && !xdg_state.is_empty()
        {
            return Some(PathBuf::from(xdg_state).join(APP_DIR));
        }

        #[cfg(windows)]
        {
            dirs::data_local_dir().map(|p| p.join(APP_DIR))
        }

        #[cfg(not(windows))]
        {
            dirs::home_dir().map(|p| p.join(".local").join("state").join(APP_DIR))
        }
    }
}
