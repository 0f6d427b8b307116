use thiserror::Error;

/// Hue error type 1: the username is not (or no longer) whitelisted.
pub const ERROR_UNAUTHORIZED_USER: u16 = 1;

/// Hue error type 101: registration attempted before the link button was pressed.
pub const ERROR_LINK_BUTTON_NOT_PRESSED: u16 = 101;

/// Top-level error type for the `nuimo-hue-api` crate.
///
/// Covers transport failures, HTTP-level rejections, and the structured
/// `{"error": {"type", "address", "description"}}` entries the bridge
/// returns inside an otherwise successful response.
#[derive(Debug, Error)]
pub enum Error {
    // ── Bridge replies ──────────────────────────────────────────────
    /// Registration was rejected because nobody pressed the link button.
    #[error("Link button not pressed")]
    LinkButtonNotPressed,

    /// The username used for the request is not known to the bridge.
    #[error("Unauthorized user: {address}")]
    UnauthorizedUser { address: String },

    /// Any other structured error entry returned by the bridge.
    #[error("Bridge error {code} at '{address}': {description}")]
    Bridge {
        code: u16,
        address: String,
        description: String,
    },

    /// Non-2xx HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The bridge host could not be turned into a base URL.
    #[error("Invalid bridge host: '{0}'")]
    InvalidHost(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Build the error matching a bridge `{"error": {...}}` entry.
    pub fn from_bridge(code: u16, address: String, description: String) -> Self {
        match code {
            ERROR_LINK_BUTTON_NOT_PRESSED => Self::LinkButtonNotPressed,
            ERROR_UNAUTHORIZED_USER => Self::UnauthorizedUser { address },
            _ => Self::Bridge {
                code,
                address,
                description,
            },
        }
    }

    /// Returns `true` if the request never got an answer from the bridge.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidHost(_) | Self::InvalidUrl(_))
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::LinkButtonNotPressed => true,
            _ => false,
        }
    }
}
