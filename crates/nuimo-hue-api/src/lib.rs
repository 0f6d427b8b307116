// nuimo-hue-api: Async Rust client for the Hue bridge HTTP API

pub mod bridge;
pub mod discovery;
pub mod error;
pub mod models;
pub mod transport;

pub use bridge::BridgeClient;
pub use discovery::{DEFAULT_DISCOVERY_URL, DiscoveryClient};
pub use error::Error;
pub use models::{DiscoveredBridge, GroupId, LightState};
pub use transport::TransportConfig;
