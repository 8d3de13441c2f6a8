//! lms-validate - Validate LMS connection credentials from the command line
//!
//! Runs the same validation an integration would before storing credentials:
//! structural checks, a connection test, permission probes and metadata
//! collection. The verdict is printed as JSON on stdout; logs go to stderr.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

use error::CliResult;

/// lms-validate - LMS credential validation
#[derive(Parser)]
#[command(name = "lms-validate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate credentials against an LMS instance
    Validate(commands::validate::ValidateArgs),

    /// List supported LMS types
    Types(commands::types::TypesArgs),
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,lms_validator=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Validate(args) => commands::validate::execute(args).await,
        Commands::Types(args) => commands::types::execute(args),
    }
}
