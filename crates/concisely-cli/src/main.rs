//! CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use concisely_cli::{Cli, Settings, dispatch, logging};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = Settings::from_env();

    match dispatch(&cli, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
