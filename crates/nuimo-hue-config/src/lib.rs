//! Configuration for nuimo-hue.
//!
//! One TOML file (`[hue]`, `[mqtt]`, `[commissioning]`) merged over
//! built-in defaults and `NUIMO_HUE_*` environment overrides, plus the
//! file-backed [`CredentialPersistence`] used to store the bridge
//! credential after commissioning.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use nuimo_hue_core::{
    BridgeCredential, CredentialPersistence, DEFAULT_APP_DESCRIPTION, DEFAULT_DISCOVERY_URL,
    GroupId, RetryPolicy, StoreError, TransportConfig,
};

/// Prefix of environment overrides. Nested keys use `__`, e.g.
/// `NUIMO_HUE_HUE__HOST`.
pub const ENV_PREFIX: &str = "NUIMO_HUE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub hue: HueConfig,

    #[serde(default)]
    pub mqtt: MqttConfig,

    #[serde(default)]
    pub commissioning: CommissioningConfig,
}

/// Bridge address, credential and HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HueConfig {
    /// Bridge address. Empty until commissioning finds one.
    #[serde(default)]
    pub host: String,

    /// Whitelisted bridge user. Empty until registration succeeds.
    #[serde(default)]
    pub username: String,

    /// Light group targeted by gestures (`0` = all lights).
    #[serde(default)]
    pub group: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_discovery_url")]
    pub discovery_url: String,
}

impl Default for HueConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            group: 0,
            timeout: default_timeout(),
            discovery_url: default_discovery_url(),
        }
    }
}

/// Broker the gesture stream is bridged from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MqttConfig {
    #[serde(default = "default_mqtt_host")]
    pub host: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_mqtt_host(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommissioningConfig {
    /// Device type sent with the registration request.
    #[serde(default = "default_app_description")]
    pub app_description: String,

    /// Registration retries after the first attempt.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Seconds between registration attempts.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
}

impl Default for CommissioningConfig {
    fn default() -> Self {
        Self {
            app_description: default_app_description(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
fn default_discovery_url() -> String {
    DEFAULT_DISCOVERY_URL.into()
}
fn default_mqtt_host() -> String {
    "ws://broker.mqttdashboard.com:8000".into()
}
fn default_app_description() -> String {
    DEFAULT_APP_DESCRIPTION.into()
}
fn default_retries() -> u32 {
    5
}
fn default_retry_delay() -> u64 {
    5
}

// ── Translation to core types ───────────────────────────────────────

impl Config {
    /// The stored bridge credential.
    pub fn credential(&self) -> BridgeCredential {
        BridgeCredential::new(self.hue.host.trim(), self.hue.username.trim())
    }

    pub fn group(&self) -> GroupId {
        GroupId(self.hue.group)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.commissioning.retries,
            delay: Duration::from_secs(self.commissioning.retry_delay),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::with_timeout(Duration::from_secs(self.hue.timeout))
    }

    pub fn discovery_url(&self) -> Result<url::Url, ConfigError> {
        self.hue
            .discovery_url
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "hue.discovery_url".into(),
                reason: format!("invalid URL: {}", self.hue.discovery_url),
            })
    }

    /// Reject values that would make the process misbehave silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hue.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "hue.timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        self.discovery_url()?;
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "nuimo-hue", "nuimo-hue").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nuimo-hue");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from defaults, the file at `path` (if present)
/// and the environment.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Load only what is in the file at `path`, ignoring the environment.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    Ok(toml::from_str(&read_file_raw(path)?)?)
}

/// Raw file contents, or an empty string when the file does not exist.
fn read_file_raw(path: &Path) -> Result<String, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize `cfg` to TOML and write it to `path`.
pub fn save_config(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    write_atomic(path, &toml::to_string_pretty(cfg)?)
}

/// Write the default config to `path` unless a file is already there.
///
/// Returns `true` when a file was written.
pub fn init_config(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    save_config(path, &Config::default())?;
    Ok(true)
}

/// Write to a uniquely named sibling temp file and rename it over `path`,
/// so readers never see a partially written config.
fn write_atomic(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ── Credential persistence ──────────────────────────────────────────

/// Stores the bridge credential in the `[hue]` table of a config file.
///
/// Saving rewrites only `hue.host` and `hue.username`; every other key in
/// the file is kept as it was. Environment overrides are never written
/// back.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_credential(&self, credential: &BridgeCredential) -> Result<(), ConfigError> {
        let raw = read_file_raw(&self.path)?;
        let mut doc: toml::Table = if raw.trim().is_empty() {
            toml::Table::new()
        } else {
            raw.parse()?
        };

        let hue = doc
            .entry("hue")
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        let Some(hue) = hue.as_table_mut() else {
            return Err(ConfigError::Validation {
                field: "hue".into(),
                reason: "expected a table".into(),
            });
        };
        hue.insert("host".into(), toml::Value::String(credential.host.clone()));
        hue.insert(
            "username".into(),
            toml::Value::String(credential.username.clone()),
        );

        write_atomic(&self.path, &toml::to_string_pretty(&doc)?)
    }
}

impl CredentialPersistence for ConfigFile {
    fn load(&self) -> Result<BridgeCredential, StoreError> {
        load_file(&self.path)
            .map(|cfg| cfg.credential())
            .map_err(|e| StoreError::Load {
                message: format!("{}: {e}", self.path.display()),
            })
    }

    fn save(&self, credential: &BridgeCredential) -> Result<(), StoreError> {
        self.write_credential(credential)
            .map_err(|e| StoreError::Persist {
                message: format!("{}: {e}", self.path.display()),
            })?;
        debug!(path = %self.path.display(), "bridge credential written");
        Ok(())
    }
}
