//! bg-extract CLI tool
//!
//! Command-line interface for batch background removal through the
//! remove.bg API.

#[cfg(feature = "cli")]
use bg_extract::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
