use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{BridgeError, BridgeResult};
use crate::profile::{GRAPH_API_BASE, GRAPH_API_VERSION};

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/fulfillment".to_string()
}

fn default_max_body_bytes() -> usize {
    1_048_576
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Route Dialogflow posts fulfillment requests to. `POST /` is always served too.
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_max_body_bytes", rename = "maxBodyBytes")]
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile API
// ---------------------------------------------------------------------------

fn default_api_base() -> String {
    GRAPH_API_BASE.to_string()
}

fn default_api_version() -> String {
    GRAPH_API_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Messenger page access token, forwarded as-is to the User Profile API.
    #[serde(default, rename = "accessToken")]
    pub access_token: String,
    #[serde(default = "default_api_base", rename = "apiBase")]
    pub api_base: String,
    #[serde(default = "default_api_version", rename = "apiVersion")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs", rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

redact_debug!(
    ProfileConfig,
    redact(access_token),
    api_base,
    api_version,
    timeout_secs,
);

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            api_base: default_api_base(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

impl Config {
    pub fn validate(&self) -> BridgeResult<()> {
        let gateway = &self.gateway;
        if gateway.port == 0 {
            return Err(BridgeError::Config("gateway.port must be non-zero".into()));
        }
        if !gateway.path.starts_with('/') {
            return Err(BridgeError::Config(format!(
                "gateway.path must start with '/', got {:?}",
                gateway.path
            )));
        }
        if gateway.max_body_bytes == 0 {
            return Err(BridgeError::Config(
                "gateway.maxBodyBytes must be non-zero".into(),
            ));
        }

        let profile = &self.profile;
        let api_base = url::Url::parse(&profile.api_base).map_err(|e| {
            BridgeError::Config(format!(
                "profile.apiBase {:?} is not a valid URL: {}",
                profile.api_base, e
            ))
        })?;
        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(BridgeError::Config(format!(
                "profile.apiBase must be http or https, got {}",
                api_base.scheme()
            )));
        }
        if profile.timeout_secs == 0 {
            return Err(BridgeError::Config(
                "profile.timeoutSecs must be non-zero".into(),
            ));
        }
        if profile.access_token.is_empty() {
            warn!("profile.accessToken is empty; every profile lookup will be rejected");
        }
        Ok(())
    }
}
