// Shared test helpers; not all items are used by every test binary.
#![allow(unused)]

use fulfillment_bridge::config::{GatewayConfig, ProfileConfig};
use fulfillment_bridge::gateway::{self, FulfillmentService};
use fulfillment_bridge::profile::GraphProfileClient;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use wiremock::MockServer;

pub const PAGE_TOKEN: &str = "EAAG-test-page-token";

/// A Dialogflow v2 webhook body as sent for a Messenger conversation.
pub fn v2_request(session: &str, sender_id: &str, query_result: Value) -> Value {
    let mut query_result = query_result;
    query_result["originalDetectIntentRequest"] = json!({
        "source": "facebook",
        "payload": {
            "data": {
                "sender": {"id": sender_id},
                "recipient": {"id": "1790000000000000"},
                "message": {"text": "hi", "mid": "m_1"}
            },
            "source": "facebook"
        }
    });
    json!({
        "responseId": "b8a3f5e6-1c1d-4b5a-9d7e-2f3b4c5d6e7f",
        "session": session,
        "queryResult": query_result
    })
}

/// A User Profile API response body.
pub fn graph_profile(first_name: &str, last_name: &str) -> Value {
    json!({
        "first_name": first_name,
        "last_name": last_name,
        "profile_pic": format!(
            "https://platform-lookaside.fbsbx.com/{}.jpg",
            first_name.to_lowercase()
        ),
        "locale": "en_US",
        "timezone": -5,
        "gender": "female",
        "id": "1234"
    })
}

/// Start the webhook on an ephemeral port, resolving profiles against `graph`.
pub async fn start_bridge(graph: &MockServer) -> (JoinHandle<()>, SocketAddr) {
    let profile = ProfileConfig {
        access_token: PAGE_TOKEN.to_string(),
        api_base: graph.uri(),
        ..ProfileConfig::default()
    };
    let gateway = GatewayConfig {
        port: 0,
        ..GatewayConfig::default()
    };
    let service = FulfillmentService::new(Arc::new(GraphProfileClient::from_config(&profile)));
    gateway::start(&gateway, service).await.unwrap()
}

/// POST a raw body to the running bridge; returns status and body text.
pub async fn post(addr: SocketAddr, uri: &str, body: String) -> (u16, String) {
    let resp = reqwest::Client::new()
        .post(format!("http://{}{}", addr, uri))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.text().await.unwrap())
}
