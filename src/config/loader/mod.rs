use crate::config::Config;
use crate::utils::{ensure_dir, get_bridge_home};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_bridge_home()?.join("config.json"))
}

/// Load the config file and validate it.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = read_config(config_path)?;
    config
        .validate()
        .with_context(|| "Configuration validation failed")?;
    Ok(config)
}

/// Read the config file, falling back to defaults when it does not exist.
///
/// Credential env vars are applied on top in both cases. The result is not
/// validated, so callers can layer further overrides first.
pub fn read_config(config_path: Option<&Path>) -> Result<Config> {
    let default_path = get_config_path().unwrap_or_else(|_| PathBuf::from("config.json"));
    let path = config_path.unwrap_or(default_path.as_path());

    let mut config = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        check_file_permissions(path);
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON from {}", path.display()))?
    } else {
        debug!("no config at {}, using defaults", path.display());
        Config::default()
    };

    crate::config::credentials::apply_env_overrides(&mut config);
    Ok(config)
}

/// Warn if the config file is readable by group or others; it may hold the page token.
#[cfg(unix)]
fn check_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = fs::metadata(path) {
        let mode = meta.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(
                "config file {} has permissions {:o}, recommend 0600",
                path.display(),
                mode & 0o777
            );
        }
    }
}

#[cfg(not(unix))]
fn check_file_permissions(_path: &Path) {}

pub fn save_config(config: &Config, config_path: Option<&Path>) -> Result<PathBuf> {
    let default_path = get_config_path().unwrap_or_else(|_| PathBuf::from("config.json"));
    let path = config_path.unwrap_or(default_path.as_path());

    ensure_dir(path.parent().context("Config path has no parent")?)?;

    let content = serde_json::to_string_pretty(config)?;
    crate::utils::atomic_write(path, &content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    // Restrict permissions (best-effort, may fail on Windows)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }

    Ok(path.to_path_buf())
}
