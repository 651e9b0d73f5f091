#![forbid(unsafe_code)]

//! Thin entrypoint for the `eywa` binary.

use std::process;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_logging();
    let exit_code = eywa_cli::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}

/// Installs the global tracing subscriber on stderr. Quiet by default so
/// command output stays clean; `RUST_LOG` overrides.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
