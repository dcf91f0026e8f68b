//! lambda-efs - compose and deploy a function with a mounted network filesystem

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lambda_efs_cli::cli::Cli;
use lambda_efs_cli::output::json::{error_code, format_error};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let json = cli.json;
    if let Err(e) = cli.run().await {
        if json {
            match format_error(&format!("{e:#}"), error_code(&e)) {
                Ok(obj) => println!("{obj}"),
                Err(_) => eprintln!("Error: {e}"),
            }
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}
