
use crate::config::credentials::CREDENTIAL_ENV_VARS;
use crate::config::{Config, get_config_path, read_config, save_config};
use crate::fulfillment::{ContextInjection, UserProfile, build_reply, extract_user_id};
use crate::gateway::{self, FulfillmentService};
use crate::profile::GraphProfileClient;
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "fulfillment-bridge")]
#[command(about = "Dialogflow fulfillment webhook that injects Messenger user profiles")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.fulfillment-bridge/config.json)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fulfillment webhook server
    Serve {
        /// Override gateway.host
        #[arg(long)]
        host: Option<String>,
        /// Override gateway.port
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// Write a default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Shape a reply offline from a saved webhook request and profile
    Render {
        /// Dialogflow webhook request body (JSON)
        #[arg(long, short = 'r')]
        request: PathBuf,
        /// User profile (JSON, camelCase fields)
        #[arg(long)]
        profile: PathBuf,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            serve(cli.config.as_deref(), host, port).await?;
        }
        Commands::Init { force } => {
            let path = init(cli.config.as_deref(), force)?;
            println!("Wrote default config to {}", path.display());
            for (name, env) in CREDENTIAL_ENV_VARS {
                println!("Set {} via the {} environment variable.", name, env);
            }
        }
        Commands::Render { request, profile } => {
            let reply = render(&request, &profile)?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.gateway.host = host;
    }
    if let Some(port) = port {
        config.gateway.port = port;
    }
}

/// Read the config, apply command-line overrides, then validate the result.
fn serve_config(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<Config> {
    let mut config = read_config(config_path)?;
    apply_overrides(&mut config, host, port);
    config
        .validate()
        .with_context(|| "Configuration validation failed")?;
    Ok(config)
}

async fn serve(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> Result<()> {
    info!("Loading configuration...");
    let config = serve_config(config_path, host, port)?;
    debug!("profile API settings: {:?}", config.profile);

    let lookup = Arc::new(GraphProfileClient::from_config(&config.profile));
    let service = FulfillmentService::new(lookup);
    let (server, addr) = gateway::start(&config.gateway, service).await?;
    println!(
        "Fulfillment webhook listening on http://{}{}",
        addr, config.gateway.path
    );

    let abort = server.abort_handle();
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
            abort.abort();
        }
        _ = server => {}
    }

    Ok(())
}

fn init(config_path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => get_config_path()?,
    };
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    save_config(&Config::default(), Some(&path))
}

fn render(request_path: &Path, profile_path: &Path) -> Result<Value> {
    let request = std::fs::read_to_string(request_path)
        .with_context(|| format!("Failed to read {}", request_path.display()))?;
    let profile = std::fs::read_to_string(profile_path)
        .with_context(|| format!("Failed to read {}", profile_path.display()))?;
    render_reply(&request, &profile)
}

/// Shape the reply the webhook would send for `request` once `profile` was fetched.
fn render_reply(request: &str, profile: &str) -> Result<Value> {
    let request: Value =
        serde_json::from_str(request).with_context(|| "Request is not valid JSON")?;
    let profile: UserProfile =
        serde_json::from_str(profile).with_context(|| "Profile is not valid JSON")?;

    match extract_user_id(&request) {
        Some(id) => debug!("request sender id: {}", id),
        None => debug!("request has no sender id; the live webhook would reject it"),
    }

    let reply = build_reply(&request, &ContextInjection::user_profile(&profile))?;
    Ok(reply.to_body())
}
