//! SCLMASK CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, dispatch to
//! pair or SAFE processing, and exit with appropriate status.
//! For programmatic use, prefer the library API (`sclmask::api`).

use clap::Parser;

mod cli;

fn main() {
    let args = cli::CliArgs::parse();
    if let Err(e) = cli::run(args) {
        eprintln!("ERROR: {}. Exiting.", e);
        std::process::exit(1);
    }
}
