#![allow(clippy::unwrap_used)]
// End-to-end tests of `HueBridge` behind the commissioner and the
// lighting controller, against a wiremock bridge.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nuimo_hue_core::{
    BridgeCommissioner, BridgeCredential, CommissionError, CredentialStore, HueBridge,
    LightingBridge, LightingController, LightingError, LightingIntent, LightingOutcome,
    RetryPolicy, TransportConfig,
};

fn hue_bridge(server: &MockServer) -> Arc<HueBridge> {
    let discovery_url = Url::parse(&format!("{}/discovery", server.uri())).unwrap();
    Arc::new(HueBridge::new(discovery_url, &TransportConfig::default()).unwrap())
}

fn bridge_host(server: &MockServer) -> String {
    server.address().to_string()
}

#[tokio::test]
async fn test_commissioning_discovers_and_registers() {
    let server = MockServer::start().await;
    let host = bridge_host(&server);

    Mock::given(method("GET"))
        .and(path("/discovery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "001788fffe100491", "internalipaddress": host.clone(), "port": 443 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_json(json!({ "devicetype": "Nuimo Hue controller app" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "success": { "username": "83b7780291a6ceffbe0bd049104df" } }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let bridge = hue_bridge(&server);
    let commissioner = BridgeCommissioner::new(bridge.clone(), bridge);

    let credential = commissioner
        .ensure_credential(&BridgeCredential::empty())
        .await
        .unwrap();

    assert_eq!(
        credential,
        BridgeCredential::new(host, "83b7780291a6ceffbe0bd049104df")
    );
}

#[tokio::test]
async fn test_commissioning_gives_up_when_button_never_pressed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "error": { "type": 101, "address": "", "description": "link button not pressed" }
        }])))
        .expect(3)
        .mount(&server)
        .await;

    let bridge = hue_bridge(&server);
    let commissioner = BridgeCommissioner::new(bridge.clone(), bridge).with_policy(RetryPolicy {
        max_retries: 2,
        delay: Duration::from_millis(10),
    });

    let result = commissioner
        .ensure_credential(&BridgeCredential::new(bridge_host(&server), ""))
        .await;

    assert!(matches!(
        result,
        Err(CommissionError::LinkButtonTimeout { attempts: 3 })
    ));
}

#[tokio::test]
async fn test_controller_puts_group_action() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/token/groups/0/action"))
        .and(body_json(json!({ "on": false })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "success": { "/groups/0/action/on": false } }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(CredentialStore::in_memory(BridgeCredential::new(
        bridge_host(&server),
        "token",
    )));
    let controller = LightingController::new(hue_bridge(&server) as Arc<dyn LightingBridge>, store);

    let outcome = controller.execute(LightingIntent::all_off()).await;
    assert_eq!(outcome, LightingOutcome::Applied);
}

#[tokio::test]
async fn test_controller_reports_rejected_user() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/stale/groups/0/action"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "error": { "type": 1, "address": "/groups/0/action", "description": "unauthorized user" }
        }])))
        .mount(&server)
        .await;

    let store = Arc::new(CredentialStore::in_memory(BridgeCredential::new(
        bridge_host(&server),
        "stale",
    )));
    let controller = LightingController::new(hue_bridge(&server) as Arc<dyn LightingBridge>, store);

    let outcome = controller
        .execute(LightingIntent::increase_brightness(30.0))
        .await;
    assert!(matches!(
        outcome,
        LightingOutcome::Failed(LightingError::BridgeRejected { .. })
    ));
}
