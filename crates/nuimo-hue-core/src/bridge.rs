//! Bridge ports and the Hue HTTP adapter behind them.
//!
//! The commissioner and the lighting controller only see these traits, so
//! tests can drive them with in-memory fakes. [`HueBridge`] implements all
//! three on top of `nuimo-hue-api`.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use nuimo_hue_api::{
    BridgeClient, DiscoveredBridge, DiscoveryClient, Error as ApiError, GroupId, LightState,
    TransportConfig,
};

use crate::credential::BridgeCredential;

/// Finds bridges on the local network.
#[async_trait]
pub trait BridgeDiscovery: Send + Sync {
    async fn discover_bridges(&self) -> Result<Vec<DiscoveredBridge>, ApiError>;
}

/// Creates a whitelisted user on a bridge.
#[async_trait]
pub trait BridgeRegistrar: Send + Sync {
    /// Returns the new username, or an error while the link button has
    /// not been pressed.
    async fn register_user(&self, host: &str, app_description: &str) -> Result<String, ApiError>;
}

/// Applies light states to bridge groups.
#[async_trait]
pub trait LightingBridge: Send + Sync {
    async fn set_group_light_state(
        &self,
        credential: &BridgeCredential,
        group: GroupId,
        state: &LightState,
    ) -> Result<(), ApiError>;
}

// ── Hue adapter ──────────────────────────────────────────────────────

/// All three bridge ports backed by the real Hue HTTP API.
///
/// Holds one `reqwest::Client`; a [`BridgeClient`] is built per call from
/// the host in hand, since the host is only known after commissioning.
#[derive(Debug, Clone)]
pub struct HueBridge {
    http: reqwest::Client,
    discovery: DiscoveryClient,
}

impl HueBridge {
    pub fn new(discovery_url: Url, transport: &TransportConfig) -> Result<Self, ApiError> {
        let http = transport.build_client()?;
        Ok(Self {
            discovery: DiscoveryClient::with_client(http.clone(), discovery_url),
            http,
        })
    }

    fn client_for(&self, host: &str) -> Result<BridgeClient, ApiError> {
        BridgeClient::for_host(self.http.clone(), host)
    }
}

#[async_trait]
impl BridgeDiscovery for HueBridge {
    async fn discover_bridges(&self) -> Result<Vec<DiscoveredBridge>, ApiError> {
        self.discovery.discover().await
    }
}

#[async_trait]
impl BridgeRegistrar for HueBridge {
    async fn register_user(&self, host: &str, app_description: &str) -> Result<String, ApiError> {
        self.client_for(host)?.register_user(app_description).await
    }
}

#[async_trait]
impl LightingBridge for HueBridge {
    async fn set_group_light_state(
        &self,
        credential: &BridgeCredential,
        group: GroupId,
        state: &LightState,
    ) -> Result<(), ApiError> {
        let echoed = self
            .client_for(&credential.host)?
            .set_group_state(&credential.username, group, state)
            .await?;
        debug!(group = %group, entries = echoed.len(), "group state applied");
        Ok(())
    }
}
