use std::io;

use anyhow::{Context, Result};
use log::*;

use heapsim::{config::Config, driver::Driver, Allocator};

fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let config = Config::from_env()?;

    // Without an arena there is no allocator to report errors
    // through, so this is the one failure that ends the
    // program.
    let allocator = Allocator::initialize(config.arena_size)
        .context("Failed to allocate heap memory.")?;

    let stdin = io::stdin();
    let mut driver = Driver::new(allocator, stdin.lock(), io::stdout());
    driver.run()?;

    info!("Heap simulator exited.");
    Ok(())
}
