//! vaultweb - Export an Obsidian vault as a self-contained static website.

mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod site;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ExportConfig;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let source = cli.command.source();
    let config = ExportConfig::load(&source.vault, cli.config.as_deref(), cli.command.options())?;

    let session = CancellationToken::new();
    core::register_session(session.clone());

    let styles = source.styles.as_deref();
    match &cli.command {
        Commands::Export { pages, output, .. } => {
            cli::export::export_site(&config, styles, pages, output, session).await
        }
        Commands::Assets { kind, .. } => {
            cli::assets::list_assets(&config, styles, *kind, session).await
        }
    }
}
