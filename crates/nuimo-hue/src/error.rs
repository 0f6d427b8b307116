//! CLI error types with miette diagnostics.
//!
//! Maps config, store and commissioning errors into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use nuimo_hue_config::ConfigError;
use nuimo_hue_core::{ApiError, CommissionError, StoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Commissioning ────────────────────────────────────────────────
    #[error("No Hue bridge found on the local network")]
    #[diagnostic(
        code(nuimo_hue::no_bridge),
        help(
            "Make sure the bridge is powered and on the same network.\n\
             If discovery is blocked, set the address by hand:\n\
             [hue]\n\
             host = \"192.168.1.x\""
        )
    )]
    NoBridgeFound,

    #[error("Bridge discovery failed: {reason}")]
    #[diagnostic(
        code(nuimo_hue::discovery_failed),
        help("Check internet access or set hue.host in the config file.")
    )]
    DiscoveryFailed { reason: String },

    #[error("Link button was not pressed ({attempts} attempts)")]
    #[diagnostic(
        code(nuimo_hue::link_button),
        help("Press the round button on top of the bridge, then run: nuimo-hue setup")
    )]
    LinkButtonTimeout { attempts: u32 },

    #[error("Setup interrupted")]
    #[diagnostic(code(nuimo_hue::interrupted))]
    Interrupted,

    // ── Bridge ───────────────────────────────────────────────────────
    #[error("Could not reach the Hue bridge")]
    #[diagnostic(
        code(nuimo_hue::connection_failed),
        help("Check hue.host and hue.timeout in the config file.")
    )]
    Bridge {
        #[source]
        source: ApiError,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nuimo_hue::validation))]
    Validation { field: String, reason: String },

    #[error("Could not load configuration from {path}")]
    #[diagnostic(
        code(nuimo_hue::config),
        help("Fix the file, or create a fresh one with: nuimo-hue config init")
    )]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("Could not save the bridge credential")]
    #[diagnostic(
        code(nuimo_hue::persist),
        help("Make sure the config directory is writable.")
    )]
    Store(#[from] StoreError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoBridgeFound => exit_code::NOT_FOUND,
            Self::DiscoveryFailed { .. } | Self::Bridge { .. } => exit_code::CONNECTION,
            Self::LinkButtonTimeout { .. } => exit_code::TIMEOUT,
            Self::Interrupted => exit_code::INTERRUPTED,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config { .. } | Self::Store(_) => exit_code::CONFIG,
            Self::Io(_) => exit_code::GENERAL,
        }
    }

    pub fn config(path: &std::path::Path, source: ConfigError) -> Self {
        match source {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            source => Self::Config {
                path: path.display().to_string(),
                source,
            },
        }
    }
}

// ── Core error mapping ───────────────────────────────────────────────

impl From<CommissionError> for CliError {
    fn from(err: CommissionError) -> Self {
        match err {
            CommissionError::NoBridgeFound => Self::NoBridgeFound,
            CommissionError::DiscoveryFailed { reason } => Self::DiscoveryFailed { reason },
            CommissionError::LinkButtonTimeout { attempts } => Self::LinkButtonTimeout { attempts },
            CommissionError::Cancelled => Self::Interrupted,
        }
    }
}

impl From<ApiError> for CliError {
    fn from(source: ApiError) -> Self {
        Self::Bridge { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commissioning_errors_map_to_distinct_codes() {
        assert_eq!(
            CliError::from(CommissionError::NoBridgeFound).exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(
            CliError::from(CommissionError::LinkButtonTimeout { attempts: 6 }).exit_code(),
            exit_code::TIMEOUT
        );
        assert_eq!(
            CliError::from(CommissionError::Cancelled).exit_code(),
            exit_code::INTERRUPTED
        );
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err = CliError::config(
            std::path::Path::new("config.toml"),
            ConfigError::Validation {
                field: "hue.timeout".into(),
                reason: "must be at least 1 second".into(),
            },
        );
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
