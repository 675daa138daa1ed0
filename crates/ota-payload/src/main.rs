use std::process::ExitCode;

use clap::Parser;
use ota_payload::cli::{self, PayloadArgs};

fn main() -> ExitCode {
    let args = PayloadArgs::parse();
    ota_common::log::init(if args.quiet { "warn" } else { "info" });

    match cli::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
