//! Letterboxd card - HTTP server for diary activity cards.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use letterboxd_card::{AppState, Config, router};

/// Letterboxd card - diary activity as HTML/SVG/PNG.
#[derive(Parser, Debug)]
#[command(name = "letterboxd-card")]
#[command(about = "Diary activity card server for Letterboxd profiles", long_about = None)]
struct Args {
    /// Path to .env file (optional).
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if std::path::Path::new(&args.dotenv).exists() {
        dotenvy::from_path(&args.dotenv)?;
        eprintln!("Loaded environment from {}", args.dotenv);
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();

    // The page template loads and validates here; a template without its
    // content marker aborts startup instead of failing per request.
    let state = AppState::new(config)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "card server listening");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
