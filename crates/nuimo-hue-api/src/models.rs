// Wire types for the Hue bridge API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower/upper bound accepted by the bridge for `bri_inc`.
pub const BRI_INC_LIMIT: i16 = 254;

/// A bridge returned by the discovery service.
///
/// Shape: `{"id": "001788fffe...", "internalipaddress": "192.168.1.2", "port": 443}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredBridge {
    pub id: String,
    #[serde(rename = "internalipaddress")]
    pub internal_ip_address: String,
    #[serde(default)]
    pub port: Option<u16>,
}

impl DiscoveredBridge {
    /// The address to store as the bridge host.
    pub fn host(&self) -> &str {
        &self.internal_ip_address
    }
}

/// Identifier of a bridge light group. Group `0` contains every light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

impl GroupId {
    /// The special group holding all lights known to the bridge.
    pub const ALL_LIGHTS: Self = Self(0);
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for GroupId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Body of a `PUT /api/{username}/groups/{id}/action` request.
///
/// Only the attributes this workspace needs are modeled; unset fields are
/// omitted from the JSON so the bridge leaves them untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,

    /// Relative brightness change, -254 to 254.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri_inc: Option<i16>,
}

impl LightState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self) -> Self {
        self.on = Some(true);
        self
    }

    pub fn off(mut self) -> Self {
        self.on = Some(false);
        self
    }

    /// Relative brightness change, clamped to the range the bridge accepts.
    pub fn bri_inc(mut self, value: i16) -> Self {
        self.bri_inc = Some(value.clamp(-BRI_INC_LIMIT, BRI_INC_LIMIT));
        self
    }
}

// ── Reply envelope ──────────────────────────────────────────────────

/// One entry of the array every bridge write endpoint returns.
///
/// `[{"success": {...}}, {"error": {"type": 101, ...}}]`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum BridgeReply {
    Success(serde_json::Value),
    Error(BridgeErrorBody),
}

#[derive(Debug, Deserialize)]
pub(crate) struct BridgeErrorBody {
    #[serde(rename = "type")]
    pub code: u16,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn light_state_omits_unset_fields() {
        let state = LightState::new().on().bri_inc(2);
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({ "on": true, "bri_inc": 2 })
        );
    }

    #[test]
    fn off_state_only_sends_on_flag() {
        let state = LightState::new().off();
        assert_eq!(serde_json::to_value(&state).unwrap(), json!({ "on": false }));
    }

    #[test]
    fn bri_inc_is_clamped() {
        assert_eq!(LightState::new().bri_inc(900).bri_inc, Some(254));
        assert_eq!(LightState::new().bri_inc(-900).bri_inc, Some(-254));
    }

    #[test]
    fn discovered_bridge_parses_discovery_payload() {
        let bridge: DiscoveredBridge = serde_json::from_value(json!({
            "id": "001788fffe100491",
            "internalipaddress": "192.168.2.23",
            "port": 443
        }))
        .unwrap();
        assert_eq!(bridge.host(), "192.168.2.23");
        assert_eq!(bridge.port, Some(443));
    }

    #[test]
    fn reply_entries_deserialize_by_key() {
        let replies: Vec<BridgeReply> = serde_json::from_value(json!([
            { "success": { "/groups/0/action/on": true } },
            { "error": { "type": 101, "address": "", "description": "link button not pressed" } }
        ]))
        .unwrap();
        assert!(matches!(replies[0], BridgeReply::Success(_)));
        assert!(matches!(&replies[1], BridgeReply::Error(e) if e.code == 101));
    }
}
