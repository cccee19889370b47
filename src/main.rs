// src/main.rs

use clap::Parser;

use skyrig::cli::CliArgs;
use skyrig::logging::init_logging;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if let Err(err) = init_logging(args.log_level) {
        eprintln!("failed to initialise logging: {err}");
        std::process::exit(1);
    }

    if let Err(err) = skyrig::run(args).await {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}
