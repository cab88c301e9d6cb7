use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::OutputContext;

fn empty_text() -> Value {
    Value::String(String::new())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(|v| v.unwrap_or_else(empty_text))
}

/// Dialogflow v2 webhook response.
///
/// Field values are carried as whatever JSON the intent holds; the bridge
/// only decides which keys go back. Optional fields that are absent (or
/// `null`) on the source tree stay `None` and are never emitted. Keys
/// Dialogflow does not read back (`intent`, `queryText`, ...) are kept in
/// `extra` but left out of the reply body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(default = "empty_text", deserialize_with = "null_as_empty")]
    pub fulfillment_text: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment_messages: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_contexts: Option<Vec<OutputContext>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followup_event_input: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ResponseEnvelope {
    fn default() -> Self {
        Self {
            fulfillment_text: empty_text(),
            fulfillment_messages: None,
            source: None,
            payload: None,
            output_contexts: None,
            followup_event_input: None,
            extra: Map::new(),
        }
    }
}

impl ResponseEnvelope {
    pub fn text(fulfillment_text: impl Into<String>) -> Self {
        Self {
            fulfillment_text: Value::String(fulfillment_text.into()),
            ..Self::default()
        }
    }
}

/// What the webhook sends back: bare text or a full envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Envelope(ResponseEnvelope),
}

impl Reply {
    /// Build the JSON body sent to Dialogflow.
    ///
    /// `fulfillmentText` is always present; the optional envelope fields only
    /// when set.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        match self {
            Self::Text(text) => {
                body.insert("fulfillmentText".into(), Value::String(text.clone()));
            }
            Self::Envelope(envelope) => {
                body.insert("fulfillmentText".into(), envelope.fulfillment_text.clone());
                if let Some(messages) = &envelope.fulfillment_messages {
                    body.insert("fulfillmentMessages".into(), messages.clone());
                }
                if let Some(source) = &envelope.source {
                    body.insert("source".into(), source.clone());
                }
                if let Some(payload) = &envelope.payload {
                    body.insert("payload".into(), payload.clone());
                }
                if let Some(contexts) = &envelope.output_contexts {
                    body.insert(
                        "outputContexts".into(),
                        Value::Array(contexts.iter().map(OutputContext::to_value).collect()),
                    );
                }
                if let Some(event) = &envelope.followup_event_input {
                    body.insert("followupEventInput".into(), event.clone());
                }
            }
        }
        Value::Object(body)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<ResponseEnvelope> for Reply {
    fn from(envelope: ResponseEnvelope) -> Self {
        Self::Envelope(envelope)
    }
}
