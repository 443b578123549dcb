//! Employee facade - cached, normalized access to an upstream employee API
//!
//! Runs one facade operation per invocation, or a `session` that reads
//! commands from stdin and serves them from one shared cache.

use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use empfacade::cli::{self, Cli, CliError, Command, SessionInput};
use empfacade::data::Outcome;
use empfacade::service::EmployeeService;

/// Sets up structured logging on stderr, filtered by `RUST_LOG`
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "empfacade=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Prints a one-shot outcome: JSON on stdout for success, a message on stderr otherwise
fn print_outcome(outcome: &Outcome) -> ExitCode {
    match outcome {
        Outcome::Failure(failure) => {
            eprintln!("error ({}): {}", failure.status, failure.message);
            ExitCode::FAILURE
        }
        _ => {
            let body = outcome.body();
            println!(
                "{}",
                serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
            );
            ExitCode::SUCCESS
        }
    }
}

/// Serves commands from stdin until EOF or `exit`
async fn run_session(service: &EmployeeService) -> Result<ExitCode, CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match cli::parse_session_line(&line) {
            Ok(None) => continue,
            Ok(Some(SessionInput::Exit)) => break,
            Ok(Some(SessionInput::Command(command))) => command,
            Err(err) => {
                println!("400 {}", serde_json::json!({ "error": err.to_string() }));
                continue;
            }
        };

        match cli::execute(service, &command).await {
            Ok(outcome) => println!("{} {}", outcome.status_code(), outcome.body()),
            Err(err) => println!("400 {}", serde_json::json!({ "error": err.to_string() })),
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = cli.config()?;

    tracing::info!(
        base_url = %config.base_url,
        timeout_secs = config.timeout.as_secs(),
        "Configuration loaded"
    );

    let service = EmployeeService::from_config(&config)?;

    match &cli.command {
        Command::Session => run_session(&service).await,
        command => {
            let outcome = cli::execute(&service, command).await?;
            Ok(print_outcome(&outcome))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(2)
        }
    }
}
