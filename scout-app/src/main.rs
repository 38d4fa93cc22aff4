//! folder-scout: searches the channels of one Telegram folder for a product
//! fetched from the backend.
//!
//! Configuration comes from the environment (or `.env`):
//!
//! ```text
//! TELEGRAM_APP_ID=12345          # https://my.telegram.org
//! TELEGRAM_APP_HASH=...
//! TELEGRAM_PHONE=+15550001111
//! SUPABASE_URL=https://xyz.supabase.co
//! SUPABASE_KEY=... SUPABASE_USER=... SUPABASE_PASSWORD=...
//! ```
//!
//! Then `folder-scout` (same as `folder-scout run`). See `--help` for the
//! other commands.

mod cli;
mod commands;
mod config;
mod flow;

use std::sync::Arc;

use clap::Parser;
use scout_backend::SupabaseClient;
use scout_telegram::TelegramApi;
use scout_telegram::auth::{self, StdinPrompt};
use tokio_util::sync::DropGuard;

use crate::cli::{Cli, Command};
use crate::config::Config;

const DEFAULT_LOG_FILTER: &str = "scout_app=info,scout_telegram=info,scout_backend=info,layer_client=warn";

#[tokio::main]
async fn main() {
    // Override with RUST_LOG, e.g. RUST_LOG=scout_telegram=debug,layer_client=info
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER)).init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("\n✗ {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let (backend_config, plan) = config.run_settings()?;
            let (api, _connection) = login(&config).await?;
            let backend = SupabaseClient::sign_in(backend_config).await?;
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::warn!("cannot listen for Ctrl-C: {e}");
                    std::future::pending::<()>().await;
                }
            };
            let summary = flow::run(api, &backend, &plan, shutdown).await?;
            println!(
                "✅ Searched {} chat(s) for \"{}\": {} message(s) found",
                summary.reports.len(),
                summary.product.name,
                summary.total_found(),
            );
        }
        Command::Search { folder, query } => {
            let (api, _connection) = login(&config).await?;
            commands::search(api.as_ref(), &config, folder, &query).await?;
        }
        Command::Dialogs { kind, details } => {
            let (api, _connection) = login(&config).await?;
            commands::dialogs(api.as_ref(), kind, details).await?;
        }
        Command::Analyze => {
            let (api, _connection) = login(&config).await?;
            commands::analyze(api.as_ref()).await?;
        }
        Command::Find { name } => {
            let (api, _connection) = login(&config).await?;
            commands::find(api.as_ref(), &name).await?;
        }
        Command::Channel { id, access_hash } => {
            let (api, _connection) = login(&config).await?;
            commands::channel(api.as_ref(), id, access_hash).await?;
        }
        Command::Folders(cmd) => {
            let (api, _connection) = login(&config).await?;
            commands::folders(api.as_ref(), cmd).await?;
        }

        // ── Backend only ───────────────────────────────────────────────
        Command::Products => {
            let backend = SupabaseClient::sign_in(config.take_backend()?).await?;
            commands::products(&backend).await?;
        }
        Command::Sessions => {
            let backend = SupabaseClient::sign_in(config.take_backend()?).await?;
            commands::sessions(&backend).await?;
        }
    }
    Ok(())
}

/// Connect with the stored session, logging in interactively if needed.
/// The connection closes when the returned guard is dropped.
async fn login(config: &Config) -> Result<(Arc<dyn TelegramApi>, DropGuard), scout_telegram::Error> {
    let (client, shutdown) = auth::connect(&config.credentials()).await?;
    let guard = shutdown.drop_guard();
    if auth::ensure_authorized(&client, &config.phone, &mut StdinPrompt).await? {
        println!("✅ Signed in");
    }
    Ok((Arc::new(client), guard))
}
