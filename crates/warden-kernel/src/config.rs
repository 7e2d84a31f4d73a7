//! Kernel configuration.
//!
//! Loaded from a single TOML file; every section defaults so a bare or
//! missing file produces a working configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// The file that was being read.
        path: String,
        /// The underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML (or has wrong field types).
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// The file that was being parsed.
        path: String,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range or empty.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What was wrong.
        reason: String,
    },
}

/// Root configuration for the kernel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command execution settings.
    pub execution: ExecutionConfig,
    /// Knowledge-base storage settings.
    pub kb: KbConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Settings for the shell-backed command runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Shell binary used to run approved commands.
    pub shell: String,
    /// Suggested client polling cadence for `execution/status`, in
    /// milliseconds. Advisory; the kernel never pushes.
    pub status_poll_interval_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
            status_poll_interval_ms: 500,
        }
    }
}

/// Settings for the knowledge-base store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KbConfig {
    /// Root directory for knowledge-base documents.
    pub root: PathBuf,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("kb"),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or defaults when the file does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file exists but cannot be read,
    /// parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns the underlying TOML error on malformed input.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.shell.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "execution.shell must be non-empty".to_string(),
            });
        }
        if self.execution.status_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "execution.status_poll_interval_ms must be positive".to_string(),
            });
        }
        if self.kb.root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "kb.root must be non-empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.execution.shell, "bash");
        assert_eq!(config.execution.status_poll_interval_ms, 500);
        assert_eq!(config.kb.root, PathBuf::from("kb"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config = Config::from_toml("[execution]\nshell = \"zsh\"\n").unwrap();
        assert_eq!(config.execution.shell, "zsh");
        assert_eq!(config.execution.status_poll_interval_ms, 500);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/warden.toml")).unwrap();
        assert_eq!(config.execution.shell, "bash");
    }

    #[test]
    fn test_empty_shell_is_rejected() {
        let config = Config::from_toml("[execution]\nshell = \"\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
