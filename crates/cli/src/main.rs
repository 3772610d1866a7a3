//! # querylab: LLM Lab Runner
//!
//! Thin entrypoint for the `querylab` command-line interface. All logic lives
//! in the `querylab_cli` library crate.

use anyhow::Result;
use clap::Parser;
use querylab_cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load `.env`, if any
    dotenvy::dotenv().ok();

    // 2. Setup logging; stdout is reserved for results
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive("querylab=info".parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 3. Parse CLI arguments
    let cli = Cli::parse();

    // 4. Run the command and report a failure with a non-zero exit
    if let Err(e) = run(cli).await {
        eprintln!("[querylab error] Failed to execute command: {e:?}");
        std::process::exit(1);
    }

    Ok(())
}
