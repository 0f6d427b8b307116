// ── Lighting controller ──
//
// Turns a `LightingIntent` into one bridge call. Failures are classified,
// logged and handed back as a value; nothing here is retried.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::bridge::LightingBridge;
use crate::credential::{BridgeCredential, CredentialStore};
use crate::error::LightingError;
use crate::intent::LightingIntent;

/// How a single intent ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightingOutcome {
    Applied,
    /// No usable credential yet; no call was made.
    Skipped,
    Failed(LightingError),
}

pub struct LightingController {
    bridge: Arc<dyn LightingBridge>,
    store: Arc<CredentialStore>,
}

impl LightingController {
    pub fn new(bridge: Arc<dyn LightingBridge>, store: Arc<CredentialStore>) -> Self {
        Self { bridge, store }
    }

    /// Apply `intent` with an explicit credential.
    ///
    /// An unconfigured credential is a successful no-op.
    pub async fn apply_intent(
        &self,
        intent: &LightingIntent,
        credential: &BridgeCredential,
    ) -> Result<(), LightingError> {
        if !credential.is_configured() {
            debug!(?intent, "no bridge credential, skipping lighting call");
            return Ok(());
        }

        self.bridge
            .set_group_light_state(credential, intent.target_group, &intent.light_state())
            .await
            .map_err(LightingError::from)
    }

    /// Apply `intent` with the store's current credential and log the result.
    pub async fn execute(&self, intent: LightingIntent) -> LightingOutcome {
        let credential = self.store.current();
        if !credential.is_configured() {
            debug!(?intent, "no bridge credential, skipping lighting call");
            return LightingOutcome::Skipped;
        }

        match self.apply_intent(&intent, &credential).await {
            Ok(()) => {
                debug!(?intent, host = %credential.host, "lighting intent applied");
                LightingOutcome::Applied
            }
            Err(e) => {
                warn!(
                    ?intent,
                    host = %credential.host,
                    kind = e.kind(),
                    error = %e,
                    "lighting call failed"
                );
                LightingOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use nuimo_hue_api::{Error as ApiError, GroupId, LightState};
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct RecordingBridge {
        calls: Mutex<Vec<(GroupId, LightState)>>,
        fail_with: Mutex<Option<ApiError>>,
    }

    #[async_trait]
    impl LightingBridge for RecordingBridge {
        async fn set_group_light_state(
            &self,
            _credential: &BridgeCredential,
            group: GroupId,
            state: &LightState,
        ) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push((group, state.clone()));
            match self.fail_with.lock().unwrap().take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    fn controller(bridge: &Arc<RecordingBridge>, credential: BridgeCredential) -> LightingController {
        LightingController::new(
            Arc::clone(bridge) as Arc<dyn LightingBridge>,
            Arc::new(CredentialStore::in_memory(credential)),
        )
    }

    fn configured() -> BridgeCredential {
        BridgeCredential::new("10.0.0.2", "token")
    }

    #[tokio::test]
    async fn all_off_is_idempotent() {
        let bridge = Arc::new(RecordingBridge::default());
        let controller = controller(&bridge, configured());

        assert_eq!(controller.execute(LightingIntent::all_off()).await, LightingOutcome::Applied);
        assert_eq!(controller.execute(LightingIntent::all_off()).await, LightingOutcome::Applied);

        let calls = bridge.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (GroupId::ALL_LIGHTS, LightState::new().off()));
        assert_eq!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn brightness_sends_scaled_increment() {
        let bridge = Arc::new(RecordingBridge::default());
        let controller = controller(&bridge, configured());

        controller
            .execute(LightingIntent::increase_brightness(-20.0))
            .await;

        assert_eq!(
            bridge.calls.lock().unwrap()[0].1,
            LightState::new().on().bri_inc(-2)
        );
    }

    #[tokio::test]
    async fn unconfigured_credential_makes_no_call() {
        let bridge = Arc::new(RecordingBridge::default());
        let controller = controller(&bridge, BridgeCredential::new("10.0.0.2", ""));

        let outcome = controller.execute(LightingIntent::all_off()).await;

        assert_eq!(outcome, LightingOutcome::Skipped);
        assert!(bridge.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn apply_intent_with_empty_credential_is_ok() {
        let bridge = Arc::new(RecordingBridge::default());
        let controller = controller(&bridge, configured());

        controller
            .apply_intent(&LightingIntent::all_off(), &BridgeCredential::empty())
            .await
            .unwrap();

        assert!(bridge.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejection_is_classified() {
        let bridge = Arc::new(RecordingBridge::default());
        *bridge.fail_with.lock().unwrap() = Some(ApiError::UnauthorizedUser {
            address: "/groups/0/action".into(),
        });
        let controller = controller(&bridge, configured());

        let outcome = controller.execute(LightingIntent::all_off()).await;

        assert!(matches!(
            outcome,
            LightingOutcome::Failed(LightingError::BridgeRejected { .. })
        ));
    }

    #[tokio::test]
    async fn bad_host_is_unreachable() {
        let bridge = Arc::new(RecordingBridge::default());
        *bridge.fail_with.lock().unwrap() = Some(ApiError::InvalidHost("::bad".into()));
        let controller = controller(&bridge, configured());

        let err = controller
            .apply_intent(&LightingIntent::all_off(), &configured())
            .await
            .unwrap_err();

        assert!(matches!(err, LightingError::BridgeUnreachable { .. }));
    }

    #[tokio::test]
    async fn controller_sees_committed_credential() {
        let bridge = Arc::new(RecordingBridge::default());
        let store = Arc::new(CredentialStore::in_memory(BridgeCredential::empty()));
        let controller = LightingController::new(
            Arc::clone(&bridge) as Arc<dyn LightingBridge>,
            Arc::clone(&store),
        );

        assert_eq!(controller.execute(LightingIntent::all_off()).await, LightingOutcome::Skipped);
        store.commit(configured()).unwrap();
        assert_eq!(controller.execute(LightingIntent::all_off()).await, LightingOutcome::Applied);
    }
}
