// Bridge discovery via the Hue N-UPnP broker.
//
// Bridges phone home to the discovery service, which lists every bridge
// seen from the caller's public IP as `[{"id", "internalipaddress", "port"}]`.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::DiscoveredBridge;

/// Public discovery endpoint operated by Signify.
pub const DEFAULT_DISCOVERY_URL: &str = "https://discovery.meethue.com/";

/// Client for the bridge discovery service.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    http: reqwest::Client,
    url: Url,
}

impl DiscoveryClient {
    pub fn with_client(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }

    /// List bridges known to the discovery service.
    ///
    /// An empty list is a valid answer, not an error.
    pub async fn discover(&self) -> Result<Vec<DiscoveredBridge>, Error> {
        debug!("GET {}", self.url);

        let resp = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let bridges: Vec<DiscoveredBridge> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        debug!(count = bridges.len(), "discovery complete");
        Ok(bridges)
    }
}
