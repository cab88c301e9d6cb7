use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ResponseEnvelope, UserProfile, substitute};
use crate::errors::{BridgeError, BridgeResult};

/// Context name the Messenger profile is injected under.
pub const USER_PROFILE_CONTEXT: &str = "user_profile";

/// Number of conversational turns an injected context survives.
pub const CONTEXT_LIFESPAN: u32 = 5;

/// A Dialogflow output context attached to a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputContext {
    /// `<session>/contexts/<context name>`
    pub name: String,
    #[serde(default)]
    pub lifespan_count: u32,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl OutputContext {
    pub fn new(session: &str, context_name: &str, parameters: Map<String, Value>) -> Self {
        Self {
            name: format!("{}/contexts/{}", session, context_name),
            lifespan_count: CONTEXT_LIFESPAN,
            parameters,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".into(), Value::String(self.name.clone()));
        map.insert("lifespanCount".into(), Value::from(self.lifespan_count));
        map.insert("parameters".into(), Value::Object(self.parameters.clone()));
        Value::Object(map)
    }
}

/// A named parameter set to expand into a response and attach as its context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextInjection {
    pub context_name: String,
    pub parameters: Map<String, Value>,
}

impl ContextInjection {
    pub fn new(context_name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            context_name: context_name.into(),
            parameters,
        }
    }

    pub fn user_profile(profile: &UserProfile) -> Self {
        Self::new(USER_PROFILE_CONTEXT, profile.to_parameters())
    }

    /// Substitute placeholders in `response`, then attach this context to it.
    /// `response` itself is not modified.
    pub fn apply(&self, session: &str, response: &Value) -> BridgeResult<ResponseEnvelope> {
        let substituted = substitute(response, &self.context_name, &self.parameters);
        inject(
            substituted,
            session,
            &self.context_name,
            self.parameters.clone(),
        )
    }
}

/// Turn a (substituted) response tree into an envelope whose `outputContexts`
/// holds exactly the injected context. Any contexts already on the tree are
/// dropped; every other field is carried over.
pub fn inject(
    tree: Value,
    session: &str,
    context_name: &str,
    parameters: Map<String, Value>,
) -> BridgeResult<ResponseEnvelope> {
    let Value::Object(mut map) = tree else {
        return Err(BridgeError::Shape(format!(
            "response must be a JSON object, got {}",
            json_kind(&tree)
        )));
    };
    map.remove("outputContexts");

    let mut envelope: ResponseEnvelope = serde_json::from_value(Value::Object(map))
        .map_err(|e| BridgeError::Shape(e.to_string()))?;
    envelope.output_contexts = Some(vec![OutputContext::new(
        session,
        context_name,
        parameters,
    )]);
    Ok(envelope)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
