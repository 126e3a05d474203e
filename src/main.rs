// certexport — Application Entry Point
//
// Parses CLI arguments, initializes structured logging, and dispatches to
// the command handler. Everything runs synchronously: the keychain primitives
// are blocking calls that may suspend on a platform authorization dialog.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use certexport::cli::{execute, Cli};

fn main() {
    // Initialize tracing with env filter (RUST_LOG=certexport=debug for verbose output).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("certexport=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
