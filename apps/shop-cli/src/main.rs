//! Loyalty Shop console binary.
//!
//! All logic lives in the library crate (`shop_cli`); this file only parses
//! flags and starts a single-threaded runtime.

use clap::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = shop_cli::Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(shop_cli::run(cli))
}
