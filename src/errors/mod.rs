use serde_json::Value;
use thiserror::Error;

/// Typed error hierarchy for the fulfillment bridge.
///
/// Use at module boundaries (profile lookup, reply shaping, config validation).
/// Internal/leaf functions can continue using `anyhow::Result`; the `Internal` variant
/// allows seamless conversion via the `?` operator.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Profile lookup failed: {message}")]
    Lookup {
        message: String,
        /// Error body returned by the remote profile API, when it sent JSON.
        detail: Option<Value>,
    },

    #[error("Malformed fulfillment payload: {0}")]
    Shape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results using `BridgeError`.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
            detail: None,
        }
    }

    /// The failure reason surfaced to the webhook caller.
    ///
    /// Remote error bodies are passed through as-is so the caller sees what the
    /// profile API said; everything else collapses to its message text.
    pub fn reason(&self) -> Value {
        match self {
            Self::Lookup {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Lookup { message, .. } => Value::String(message.clone()),
            other => Value::String(other.to_string()),
        }
    }
}
