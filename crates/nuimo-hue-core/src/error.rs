// ── Core error types ──
//
// Commissioning errors are terminal and reported to the operator.
// Lighting errors are classified here and then logged and swallowed by
// the controller; they never reach the gesture path. The
// `From<&nuimo_hue_api::Error>` impl translates transport-layer errors
// into the two lighting failure classes.

use thiserror::Error;

/// Terminal outcomes of a commissioning run.
#[derive(Debug, Error)]
pub enum CommissionError {
    #[error("No Hue bridge found on the local network")]
    NoBridgeFound,

    #[error("Bridge discovery failed: {reason}")]
    DiscoveryFailed { reason: String },

    #[error("Link button was not pressed after {attempts} registration attempts")]
    LinkButtonTimeout { attempts: u32 },

    #[error("Commissioning cancelled")]
    Cancelled,
}

/// Failure classes of a lighting command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LightingError {
    /// Timeout, refused connection, or an unusable bridge address.
    #[error("Bridge unreachable: {reason}")]
    BridgeUnreachable { reason: String },

    /// The bridge answered, but with an HTTP error, an error entry, or a
    /// reply that could not be parsed.
    #[error("Bridge rejected the command: {reason}")]
    BridgeRejected { reason: String },
}

impl LightingError {
    /// Short tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BridgeUnreachable { .. } => "bridge_unreachable",
            Self::BridgeRejected { .. } => "bridge_rejected",
        }
    }
}

/// Credential load/save failures reported by a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to load bridge credential: {message}")]
    Load { message: String },

    #[error("Failed to persist bridge credential: {message}")]
    Persist { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<&nuimo_hue_api::Error> for LightingError {
    fn from(err: &nuimo_hue_api::Error) -> Self {
        let reason = err.to_string();
        if err.is_unreachable() {
            LightingError::BridgeUnreachable { reason }
        } else {
            LightingError::BridgeRejected { reason }
        }
    }
}

impl From<nuimo_hue_api::Error> for LightingError {
    fn from(err: nuimo_hue_api::Error) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_host_is_unreachable() {
        let err = LightingError::from(nuimo_hue_api::Error::InvalidHost(String::new()));
        assert!(matches!(err, LightingError::BridgeUnreachable { .. }));
    }

    #[test]
    fn bridge_error_entry_is_rejected() {
        let err = LightingError::from(nuimo_hue_api::Error::from_bridge(
            1,
            "/groups/0/action".into(),
            "unauthorized user".into(),
        ));
        assert!(matches!(err, LightingError::BridgeRejected { .. }));
    }

    #[test]
    fn http_error_is_rejected() {
        let err = LightingError::from(nuimo_hue_api::Error::Http {
            status: 500,
            body: String::new(),
        });
        assert!(matches!(err, LightingError::BridgeRejected { .. }));
    }
}
