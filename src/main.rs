//! SpeechGuard CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::prelude::*;

use speech_guard::cli::{app, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    app::run(cli).await
}

/// Logs go to stderr so stdout stays reserved for results
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "speech_guard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
