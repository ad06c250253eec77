//! Error types for the localization engine.
//!
//! Lookups never fail outward: malformed tags, bad weights and broken format
//! arguments are recovered where they occur. What remains here are setup
//! problems and failures of the collaborators around the engine.

use std::io;
use thiserror::Error;

/// Engine error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No locale was ever registered, so there is no default to fall back to.
    #[error("No default locale: register at least one locale before negotiating")]
    NoDefaultLocale,

    /// Configuration error (invalid config file, bad values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A persistence adapter could not read or write the stored choice.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A translation table could not be loaded.
    #[error("Dictionary error: {0}")]
    Dictionary(String),

    /// IO error (config files, file-backed persistence, locale directories).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenient Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true for setup errors that indicate a misconfigured engine
    /// rather than a transient runtime failure.
    pub const fn is_setup_error(&self) -> bool {
        matches!(self, Self::NoDefaultLocale | Self::Config(_) | Self::Dictionary(_))
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a dictionary error.
    pub fn dictionary(msg: impl Into<String>) -> Self {
        Self::Dictionary(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_errors() {
        assert!(Error::NoDefaultLocale.is_setup_error());
        assert!(Error::config("bad").is_setup_error());
        assert!(Error::dictionary("bad").is_setup_error());
        assert!(!Error::persistence("disk full").is_setup_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(Error::config("missing key").to_string(), "Configuration error: missing key");
        assert!(Error::NoDefaultLocale.to_string().contains("register at least one locale"));
    }
}
