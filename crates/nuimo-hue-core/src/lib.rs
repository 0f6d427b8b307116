//! Gesture-to-lighting logic between the device transport and `nuimo-hue-api`.
//!
//! - **[`CredentialStore`]** owns the bridge credential for the life of the
//!   process. Lock-free snapshots for readers, one persisted swap after
//!   commissioning.
//!
//! - **[`BridgeCommissioner`]** runs once at startup: discovery when no host
//!   is known, then user registration retried while the operator presses
//!   the link button. Progress is published on a `watch` channel.
//!
//! - **[`GestureDispatcher`]** maps each [`GestureEvent`] to a
//!   [`LightingIntent`], spawns the bridge call on a `TaskTracker` and
//!   sends feedback to the device through a [`FeedbackSink`].
//!
//! - **[`LightingController`]** executes intents with the stored credential
//!   and classifies failures as [`LightingError`].
//!
//! The bridge is reached through the ports in [`bridge`]; [`HueBridge`]
//! implements them over HTTP.

pub mod bridge;
pub mod commission;
pub mod credential;
pub mod dispatch;
pub mod error;
pub mod gesture;
pub mod intent;
pub mod lighting;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::{BridgeDiscovery, BridgeRegistrar, HueBridge, LightingBridge};
pub use commission::{
    BridgeCommissioner, CommissioningAttempt, CommissioningState, DEFAULT_APP_DESCRIPTION,
    RegistrationState, RetryPolicy,
};
pub use credential::{BridgeCredential, CredentialPersistence, CredentialStore, MemoryPersistence};
pub use dispatch::{FeedbackSink, GestureDispatcher, ProgressBarStyle};
pub use error::{CommissionError, LightingError, StoreError};
pub use gesture::{Gesture, GestureEvent};
pub use intent::{LightingIntent, LightingOperation};
pub use lighting::{LightingController, LightingOutcome};

// Transport-layer types callers need to build a `HueBridge`.
pub use nuimo_hue_api::{
    DEFAULT_DISCOVERY_URL, DiscoveredBridge, Error as ApiError, GroupId, LightState,
    TransportConfig,
};
