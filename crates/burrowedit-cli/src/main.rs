//! burrowedit: safe interactive editor for burrowd configuration
//!
//! An error in the burrow config can sever the operator's own remote
//! access, so every edit goes through an edit-validate-recover loop:
//! the daemon binary re-parses after each edit, sensitive-setting drift
//! is flagged, and nothing becomes the new baseline until it is
//! checkpointed into a git-backed version store that also powers `undo`.
//!
//! ```bash
//! burrowedit                            # edit the per-user config
//! burrowedit /etc/burrow/00-base.conf   # shared mode, escalates via sudo
//! ```

mod app;
mod args;
mod preflight;
mod signal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = args::Cli::parse();

    // RUST_LOG wins; --verbose raises the default floor
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(err) = app::run(cli).await {
        eprintln!("burrowedit: {err}");
        std::process::exit(err.exit_code());
    }
}
