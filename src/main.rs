use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pr_check_bot::checks::CheckRegistry;
use pr_check_bot::checks::builtin::{BlockingLabelsCheck, ChangelogCheck};
use pr_check_bot::config::Config;
use pr_check_bot::github::OctocrabClient;
use pr_check_bot::server::{AppState, build_router};

/// Runs registered checks on pull requests and reports them as check runs.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BOT_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Name of the bot; prefixes every check run and selects `[tool.<name>]`.
    #[arg(long, env = "BOT_NAME")]
    bot_name: String,

    /// Global TOML configuration file.
    #[arg(long, env = "BOT_CONFIG")]
    config: Option<PathBuf>,

    /// Token used for the GitHub API.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Secret for verifying webhook signatures.
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pr_check_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let global_config = match &args.config {
        Some(path) => Config::load(path, &args.bot_name)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::new(),
    };

    if args.webhook_secret.is_none() {
        tracing::warn!("No webhook secret configured; deliveries are not verified");
    }

    let registry = CheckRegistry::builder()
        .register_all_actions(ChangelogCheck)
        .register_all_actions(BlockingLabelsCheck)
        .build();
    tracing::info!(checks = registry.len(), "Registered checks");

    let github = OctocrabClient::build_with_token(args.github_token)
        .context("building GitHub client")?;

    let state = AppState::new(
        registry,
        github,
        args.bot_name,
        global_config,
        args.webhook_secret.map(String::into_bytes),
    );
    let app = build_router(state);

    tracing::info!("listening on {}", args.bind);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
