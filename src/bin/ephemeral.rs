//! Ephemeral CLI: request and send secrets over public channels
//!
//! See `ephemeral --help`.

use std::process::ExitCode;

use clap::Parser;

use ephemeral::cli::{self, Cli};

fn main() -> ExitCode {
    let args = Cli::parse();
    cli::init_logging(args.debug);

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
