use std::process::ExitCode;
use std::sync::Arc;

use asset_server::config::ServeArgs;
use asset_server::{ServerResult, server};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    ota_common::log::init("info");

    let args = ServeArgs::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ServeArgs) -> ServerResult<()> {
    let registry = Arc::new(args.registry().await?);
    info!(root = %args.root_dir.display(), "serving files");
    server::serve(registry, args.addr()).await
}
