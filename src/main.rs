//! gamecfg - Catalog-driven editor for game-server OptionSettings files
//!
//! This is the binary entry point. All logic lives in the workspace crates.

mod cli;

use clap::Parser;
use tracing::error;

fn main() -> color_eyre::Result<()> {
    let args = cli::Args::parse();

    color_eyre::install()?;

    // Logging goes to a file; a missing data dir should not stop the CLI
    if let Err(e) = gamecfg_core::logging::init() {
        eprintln!("warning: logging disabled: {}", e);
    }

    let result = cli::run(args);
    if let Err(ref e) = result {
        error!("Command failed: {:?}", e);
    }
    result
}
