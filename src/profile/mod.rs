//! Messenger profile lookup.

mod graph;

pub use graph::{GRAPH_API_BASE, GRAPH_API_VERSION, GraphProfileClient, PROFILE_FIELDS};

use async_trait::async_trait;

use crate::errors::BridgeResult;
use crate::fulfillment::{UserId, UserProfile};

/// Fetches the profile of a Messenger user.
///
/// Implementations own their own timeouts; callers await exactly one lookup
/// per webhook request and treat every error as a failed fulfillment.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn lookup(&self, user_id: &UserId) -> BridgeResult<UserProfile>;
}
