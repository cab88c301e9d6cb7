//! Dialogflow fulfillment shaping.
//!
//! Everything here is pure and synchronous: pulling the Messenger sender id out
//! of an inbound webhook body, expanding `#context.param` placeholders in the
//! intent's response, attaching the injected context, and assembling the reply
//! envelope Dialogflow expects back.

mod context;
mod extract;
mod reply;
mod template;

pub use context::{CONTEXT_LIFESPAN, ContextInjection, OutputContext, USER_PROFILE_CONTEXT, inject};
pub use extract::extract_user_id;
pub use reply::{Reply, ResponseEnvelope};
pub use template::{placeholder, render_value, substitute};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

use crate::errors::{BridgeError, BridgeResult};

/// Messenger page-scoped sender id, kept in its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Accepts numeric ids and non-empty strings; anything else is not an id.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_timezone() -> Number {
    Number::from(0)
}

/// Messenger user profile as injected into the `user_profile` context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub locale: String,
    /// UTC offset in hours; Messenger sends fractional offsets for some zones.
    #[serde(default = "default_timezone")]
    pub timezone: Number,
    #[serde(default)]
    pub gender: String,
}

impl UserProfile {
    /// Context parameters in field declaration order.
    ///
    /// The order matters: substitution walks parameters in this order, so
    /// overlapping placeholders resolve the same way on every request.
    pub fn to_parameters(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("firstName".into(), Value::String(self.first_name.clone()));
        params.insert("lastName".into(), Value::String(self.last_name.clone()));
        params.insert("profilePic".into(), Value::String(self.profile_pic.clone()));
        params.insert("locale".into(), Value::String(self.locale.clone()));
        params.insert("timezone".into(), Value::Number(self.timezone.clone()));
        params.insert("gender".into(), Value::String(self.gender.clone()));
        params
    }
}

/// Shape the reply for a v2 webhook request: expand `injection` into the
/// request's `queryResult` and attach it as the reply's only output context.
pub fn build_reply(request: &Value, injection: &ContextInjection) -> BridgeResult<Reply> {
    let session = request
        .get("session")
        .and_then(Value::as_str)
        .ok_or_else(|| BridgeError::Shape("request has no session".into()))?;
    let query_result = request
        .get("queryResult")
        .filter(|v| v.is_object())
        .ok_or_else(|| BridgeError::Shape("request has no queryResult object".into()))?;
    injection
        .apply(session, query_result)
        .map(Reply::Envelope)
}

#[cfg(test)]
mod tests;
