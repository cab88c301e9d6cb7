use serde_json::Value;
use tracing::debug;

use super::UserId;

/// Sender id location in Dialogflow v1 webhook bodies.
const V1_SENDER_PATH: &[&str] = &[
    "result",
    "originalRequest",
    "data",
    "data",
    "sender",
    "id",
];

/// Sender id location in Dialogflow v2 webhook bodies.
const V2_SENDER_PATH: &[&str] = &[
    "queryResult",
    "originalDetectIntentRequest",
    "payload",
    "data",
    "sender",
    "id",
];

/// Pull the Messenger sender id out of an inbound webhook body.
///
/// A truthy top-level `result` marks a v1 body and takes precedence over
/// `queryResult` (v2). `null`, `false`, `0` and `""` count as absent, so a body
/// with `"result": false` is still read as v2. Missing intermediates or
/// unexpected types yield `None`.
pub fn extract_user_id(body: &Value) -> Option<UserId> {
    let path = if is_present(body, "result") {
        V1_SENDER_PATH
    } else if is_present(body, "queryResult") {
        V2_SENDER_PATH
    } else {
        debug!("webhook body matches neither v1 nor v2 shape");
        return None;
    };

    let id = path
        .iter()
        .try_fold(body, |node, key| node.get(key))
        .and_then(UserId::from_json);
    if id.is_none() {
        debug!("sender id not found at {}", path.join("."));
    }
    id
}

fn is_present(body: &Value, key: &str) -> bool {
    body.get(key).is_some_and(is_truthy)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
