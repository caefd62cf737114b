// Pihelm - Remote service orchestration for a single Pi host
// Main entry point

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use clap::Parser;
use pihelm::api::{self, AppState};
use pihelm::config::Config;
use pihelm::orchestrator::Orchestrator;
use pihelm::version::build_info;

#[derive(Parser, Debug)]
#[command(name = "pihelm")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Address to bind the HTTP API (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Show version information
    #[arg(short = 'V', long)]
    version: bool,

    /// Show detailed build information
    #[arg(long)]
    build_info: bool,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle version flag
    if cli.version {
        println!("{}", build_info().format_display());
        return Ok(());
    }

    // Handle build info flag
    if cli.build_info {
        println!("{}", build_info().format_detailed());
        println!("\n{}", build_info().format_build_info());
        return Ok(());
    }

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let mut config = Config::load(cli.config.map(std::path::PathBuf::from))?;
    if let Some(bind) = cli.bind {
        config.listen = bind;
    }

    tracing::info!(
        "Pihelm starting: managing {} services on {}@{}",
        config.services.len(),
        config.user,
        config.host
    );

    let listen = config.listen.clone();
    let state = web::Data::new(AppState::new(Orchestrator::new(&config)));

    tracing::info!("HTTP API listening on {}", listen);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::configure)
    })
    .bind(&listen)?
    .run()
    .await?;

    Ok(())
}
