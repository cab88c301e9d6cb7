use super::schema::Config;
use tracing::debug;

macro_rules! define_credentials {
    ($( $name:literal, $env:literal => $($path:ident).+ );* $(;)?) => {
        /// (slot name, env var name) pairs.
        pub const CREDENTIAL_ENV_VARS: &[(&str, &str)] = &[$(($name, $env)),*];

        /// Apply environment variable overrides.
        ///
        /// Any `FULFILLMENT_BRIDGE_*` credential env var that is set and non-empty
        /// overwrites the corresponding config field, so the page token never has
        /// to live in the config file.
        pub fn apply_env_overrides(config: &mut Config) {
            $(
                if let Ok(val) = std::env::var($env) {
                    if !val.is_empty() {
                        debug!("loaded {} from {}", $name, $env);
                        config.$($path).+ = val;
                    }
                }
            )*
        }
    };
}

define_credentials! {
    "page-access-token", "FULFILLMENT_BRIDGE_PAGE_ACCESS_TOKEN" => profile.access_token;
}

#[cfg(test)]
mod tests;
