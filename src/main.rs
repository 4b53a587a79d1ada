//! problemdesk - terminal client for a coding-practice platform
//!
//! Lists and shows problems through a local response cache, submits
//! solutions and quiz answers, and manages the OTP login session.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use problemdesk::app::App;
use problemdesk::cli::{log_level, Cli, Config};

/// Sends log output to stderr so stdout stays clean for command output.
/// `RUST_LOG` takes precedence over the `-v` flags.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    let config = Config::from_cli(&cli)?;
    let mut app = App::new(&config)?;
    Ok(app.run(&cli.command).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
