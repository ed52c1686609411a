// ABOUTME: Entry point for the euraxess-gateway binary.
// ABOUTME: Loads .env, parses the command line, sets up logging, and runs serve or parse.

use anyhow::Result;
use clap::Parser;
use euraxess_gateway::{configure_logging, parse_cmd, serve, Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve(cli.serve)) {
        Command::Serve(args) => {
            configure_logging(&args.log.filter)?;
            serve(&args).await
        }
        Command::Parse(args) => {
            configure_logging(&args.log.filter)?;
            parse_cmd::run(&args).await
        }
    }
}
