//! Command-line interface for the employee facade
//!
//! This module handles parsing of CLI arguments using clap, turning them
//! into a validated [`FacadeConfig`], and dispatching a parsed command to
//! the service. It also parses the line-based commands of `session` mode.

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{ConfigError, FacadeConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::data::{NewEmployee, Outcome, UpstreamError};
use crate::service::EmployeeService;

/// Error types for the command line
#[derive(Debug, Error)]
pub enum CliError {
    /// Flags or environment produced an unusable configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] UpstreamError),

    /// Reading stdin failed in session mode
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// `session` was entered inside a session
    #[error("Sessions cannot be nested")]
    NestedSession,

    /// A session line did not parse as a command
    #[error("{0}")]
    InvalidLine(String),
}

/// Employee facade - cached, normalized access to an upstream employee API
#[derive(Parser, Debug)]
#[command(name = "empfacade")]
#[command(about = "Cached, normalized access to an upstream employee API")]
#[command(version)]
pub struct Cli {
    /// Base URL of the upstream API
    #[arg(long, env = "EMPFACADE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout for each upstream call, in seconds
    #[arg(long, env = "EMPFACADE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed by the facade
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List all employees
    List,
    /// Search employees by name (case-insensitive substring)
    Search {
        /// Text to look for in employee names
        term: String,
    },
    /// Show the highest salary
    HighestSalary,
    /// Show the names of the ten highest earners
    TopTen,
    /// Fetch one employee by ID
    Get {
        /// Employee ID
        id: String,
    },
    /// Create an employee
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        salary: String,
        #[arg(long)]
        age: String,
    },
    /// Delete an employee by ID
    Delete {
        /// Employee ID
        id: String,
    },
    /// Read commands from stdin, one per line, sharing one cache
    ///
    /// Examples:
    ///   echo "top-ten" | empfacade session
    ///   printf 'list\nsearch doe\n' | empfacade session
    Session,
}

impl Cli {
    /// Builds the validated configuration from flags and environment
    pub fn config(&self) -> Result<FacadeConfig, ConfigError> {
        FacadeConfig::new(&self.base_url, self.timeout_secs)
    }
}

/// One parsed line of session input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Command(Command),
    Exit,
}

#[derive(Parser, Debug)]
#[command(name = "empfacade", no_binary_name = true)]
struct SessionLine {
    #[command(subcommand)]
    command: Command,
}

/// Parses a session line
///
/// # Returns
/// * `Ok(None)` for blank lines and `#` comments
/// * `Ok(Some(SessionInput))` for a command or `exit`/`quit`
/// * `Err(CliError)` if the line is not a valid command
pub fn parse_session_line(line: &str) -> Result<Option<SessionInput>, CliError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if line == "exit" || line == "quit" {
        return Ok(Some(SessionInput::Exit));
    }

    let words = split_words(line)?;
    let parsed =
        SessionLine::try_parse_from(words).map_err(|e| CliError::InvalidLine(e.to_string()))?;

    match parsed.command {
        Command::Session => Err(CliError::NestedSession),
        command => Ok(Some(SessionInput::Command(command))),
    }
}

/// Splits a line on whitespace, keeping double-quoted runs together
fn split_words(line: &str) -> Result<Vec<String>, CliError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    words.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }

    if in_quotes {
        return Err(CliError::InvalidLine("Unterminated quote".to_string()));
    }
    if pending {
        words.push(current);
    }
    Ok(words)
}

/// Runs one command against the service
///
/// `session` is handled by the binary and rejected here.
pub async fn execute(service: &EmployeeService, command: &Command) -> Result<Outcome, CliError> {
    let outcome = match command {
        Command::List => service.list_employees().await,
        Command::Search { term } => service.search(term).await,
        Command::HighestSalary => service.highest_salary().await,
        Command::TopTen => service.top_ten_names().await,
        Command::Get { id } => service.get_by_id(id).await,
        Command::Create { name, salary, age } => {
            let employee = NewEmployee::new(name.as_str(), salary.as_str(), age.as_str());
            service.create(&employee).await
        }
        Command::Delete { id } => service.delete(id).await,
        Command::Session => return Err(CliError::NestedSession),
    };
    Ok(outcome)
}
