// Hue bridge HTTP client
//
// Wraps `reqwest::Client` with bridge URL construction and unwrapping of
// the `[{"success": ...}, {"error": ...}]` reply array every write endpoint
// returns. The bridge answers HTTP 200 even for rejected requests, so the
// reply entries are the real status.

use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{BridgeReply, GroupId, LightState};

const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for a single Hue bridge.
///
/// Cheap to construct: the underlying `reqwest::Client` is reference
/// counted, so one client per bridge host can share a connection pool.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BridgeClient {
    /// Create a client for `host` reusing an existing `reqwest::Client`.
    ///
    /// `host` is the address stored in the configuration, usually a bare
    /// IP (`192.168.1.20`) or `ip:port`; a full `http://` URL is accepted too.
    pub fn for_host(http: reqwest::Client, host: &str) -> Result<Self, Error> {
        Ok(Self::with_client(http, bridge_url(host)?))
    }

    /// Create a client with a pre-built `reqwest::Client` and base URL.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Create a new whitelisted user on the bridge.
    ///
    /// `POST /api` with `{"devicetype": ...}`. Until the physical link
    /// button is pressed the bridge answers with error type 101, surfaced
    /// as [`Error::LinkButtonNotPressed`].
    pub async fn register_user(&self, device_type: &str) -> Result<String, Error> {
        let url = self.api_url("api")?;
        let body = serde_json::json!({ "devicetype": device_type });

        let successes = send(self.http.post(url).json(&body)).await?;

        successes
            .iter()
            .find_map(|value| value.get("username").and_then(serde_json::Value::as_str))
            .map(str::to_owned)
            .ok_or_else(|| Error::Deserialization {
                message: "registration reply carried no username".into(),
                body: serde_json::Value::Array(successes.clone()).to_string(),
            })
    }

    /// Apply a light state to every light in `group`.
    ///
    /// `PUT /api/{username}/groups/{group}/action`. Returns the `success`
    /// entries the bridge echoed back.
    pub async fn set_group_state(
        &self,
        username: &str,
        group: GroupId,
        state: &LightState,
    ) -> Result<Vec<serde_json::Value>, Error> {
        let url = self.api_url(&format!("api/{username}/groups/{group}/action"))?;
        self.put(url, state).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    async fn put(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<serde_json::Value>, Error> {
        send(self.http.put(url).json(body)).await
    }
}

/// Turn a configured bridge host into the client base URL.
pub fn bridge_url(host: &str) -> Result<Url, Error> {
    let host = host.trim();
    if host.is_empty() {
        return Err(Error::InvalidHost(host.to_owned()));
    }

    let raw = if host.contains("://") {
        host.to_owned()
    } else {
        format!("http://{host}")
    };

    let mut url = Url::parse(&raw).map_err(|_| Error::InvalidHost(host.to_owned()))?;
    if url.host_str().is_none() {
        return Err(Error::InvalidHost(host.to_owned()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn send(builder: reqwest::RequestBuilder) -> Result<Vec<serde_json::Value>, Error> {
    if let Some(request) = builder.try_clone().and_then(|b| b.build().ok()) {
        debug!("{} {}", request.method(), request.url());
    }

    let resp = builder.send().await.map_err(Error::Transport)?;
    parse_replies(resp).await
}

/// Check the HTTP status, then split the reply array into successes or
/// the first error entry.
async fn parse_replies(resp: reqwest::Response) -> Result<Vec<serde_json::Value>, Error> {
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            body: preview(&body),
        });
    }

    let body = resp.text().await.map_err(Error::Transport)?;
    trace!(body = %preview(&body), "bridge reply");

    let replies: Vec<BridgeReply> =
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

    let mut successes = Vec::with_capacity(replies.len());
    for reply in replies {
        match reply {
            BridgeReply::Success(value) => successes.push(value),
            BridgeReply::Error(err) => {
                return Err(Error::from_bridge(err.code, err.address, err.description));
            }
        }
    }
    Ok(successes)
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
