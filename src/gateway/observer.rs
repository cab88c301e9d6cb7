use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::BridgeError;

/// Hook into each webhook exchange: the body Dialogflow sent, the reply sent
/// back, and the reason a request failed.
pub trait ExchangeObserver: Send + Sync {
    fn inbound(&self, body: &Value);
    fn outbound(&self, body: &Value);
    fn failure(&self, error: &BridgeError);
}

/// Default observer: emits the exchange as `tracing` events.
///
/// Bodies carry user profiles, so they are only logged at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ExchangeObserver for TracingObserver {
    fn inbound(&self, body: &Value) {
        debug!("fulfillment request: {}", body);
    }

    fn outbound(&self, body: &Value) {
        debug!("fulfillment reply: {}", body);
    }

    fn failure(&self, error: &BridgeError) {
        warn!("fulfillment failed: {}", error);
    }
}
