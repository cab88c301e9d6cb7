use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::ProfileLookup;
use crate::config::ProfileConfig;
use crate::errors::{BridgeError, BridgeResult};
use crate::fulfillment::{UserId, UserProfile};
use crate::utils::http::{http_client, limited_text};

pub const GRAPH_API_BASE: &str = "https://graph.facebook.com";
pub const GRAPH_API_VERSION: &str = "v2.6";

/// Profile fields requested from the User Profile API.
pub const PROFILE_FIELDS: &str = "first_name,last_name,profile_pic,locale,timezone,gender";

/// Profiles are a few hundred bytes; anything past this is not a profile.
const MAX_PROFILE_BODY: usize = 64 * 1024;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// User Profile API response. Fields the page is not allowed to read are
/// simply missing, so all of them are optional.
#[derive(Debug, Deserialize)]
struct GraphProfile {
    first_name: Option<String>,
    last_name: Option<String>,
    profile_pic: Option<String>,
    locale: Option<String>,
    timezone: Option<Number>,
    gender: Option<String>,
}

impl From<GraphProfile> for UserProfile {
    fn from(p: GraphProfile) -> Self {
        Self {
            first_name: p.first_name.unwrap_or_default(),
            last_name: p.last_name.unwrap_or_default(),
            profile_pic: p.profile_pic.unwrap_or_default(),
            locale: p.locale.unwrap_or_default(),
            timezone: p.timezone.unwrap_or_else(|| Number::from(0)),
            gender: p.gender.unwrap_or_default(),
        }
    }
}

/// Messenger User Profile API client, authenticated with a page access token.
pub struct GraphProfileClient {
    access_token: String,
    base_url: String,
    api_version: String,
    client: Client,
}

redact_debug!(
    GraphProfileClient,
    redact(access_token),
    base_url,
    api_version,
);

impl GraphProfileClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, GRAPH_API_BASE)
    }

    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: base_url.into(),
            api_version: GRAPH_API_VERSION.to_string(),
            client: http_client(DEFAULT_TIMEOUT),
        }
    }

    pub fn from_config(config: &ProfileConfig) -> Self {
        Self {
            access_token: config.access_token.clone(),
            base_url: config.api_base.clone(),
            api_version: config.api_version.clone(),
            client: http_client(Duration::from_secs(config.timeout_secs)),
        }
    }

    pub(crate) fn profile_url(&self, user_id: &UserId) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.api_version.is_empty() {
            format!("{}/{}", base, user_id)
        } else {
            format!("{}/{}/{}", base, self.api_version, user_id)
        }
    }
}

#[async_trait]
impl ProfileLookup for GraphProfileClient {
    async fn lookup(&self, user_id: &UserId) -> BridgeResult<UserProfile> {
        debug!("fetching messenger profile for user {}", user_id);
        let resp = self
            .client
            .get(self.profile_url(user_id))
            .query(&[
                ("fields", PROFILE_FIELDS),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                BridgeError::lookup(format!("profile request failed: {}", e.without_url()))
            })?;

        let status = resp.status();
        let text = limited_text(resp, MAX_PROFILE_BODY)
            .await
            .map_err(|e| BridgeError::lookup(format!("failed to read profile response: {}", e)))?;

        if !status.is_success() {
            warn!(
                "profile API returned HTTP {} for user {}",
                status.as_u16(),
                user_id
            );
            let detail = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            return Err(BridgeError::Lookup {
                message: format!("profile API returned HTTP {}", status.as_u16()),
                detail: Some(detail),
            });
        }

        let profile: GraphProfile = serde_json::from_str(&text)
            .map_err(|e| BridgeError::lookup(format!("unexpected profile response: {}", e)))?;
        Ok(profile.into())
    }
}
