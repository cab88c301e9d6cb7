use super::*;

#[test]
fn test_env_var_names_are_prefixed() {
    for (name, env) in CREDENTIAL_ENV_VARS {
        assert!(env.starts_with("FULFILLMENT_BRIDGE_"), "{name} uses {env}");
    }
}

#[test]
fn test_apply_env_overrides_sets_token() {
    let (_, env) = CREDENTIAL_ENV_VARS
        .iter()
        .find(|(name, _)| *name == "page-access-token")
        .unwrap();
    // SAFETY: single-threaded access to this variable within this test
    unsafe { std::env::set_var(env, "EAAGfromenv") };
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    unsafe { std::env::remove_var(env) };
    assert_eq!(config.profile.access_token, "EAAGfromenv");
}
