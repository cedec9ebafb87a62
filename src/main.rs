//! Command-line entry point: serve the HTTP API or print legal parameters.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Args, FromArgMatches, Parser, Subcommand};
use nomina_engine::api::{AppState, create_router};
use nomina_engine::config::ConfigLoader;
use nomina_engine::error::EngineError;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "nomina-engine",
    about = "Colombian payroll and contract settlement engine",
    version
)]
struct Cli {
    /// Directory holding country.yaml and parameters/
    #[arg(
        long,
        global = true,
        env = "NOMINA_CONFIG_DIR",
        default_value = "./config/colombia"
    )]
    config_dir: PathBuf,
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, env = "NOMINA_LOG_LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the legal parameters in force on a date as JSON
    Parameters(ParametersArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "NOMINA_HOST", default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, env = "NOMINA_PORT", default_value_t = 8080)]
    port: u16,
}

impl ServeArgs {
    /// Arguments of an implicit `serve`: defaults, overridden by the environment.
    fn implicit() -> Result<Self, clap::Error> {
        let command = Self::augment_args(clap::Command::new("serve"));
        Self::from_arg_matches(&command.try_get_matches_from(["serve"])?)
    }
}

#[derive(Args, Debug)]
struct ParametersArgs {
    /// Date to look up (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode parameters: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid log filter '{value}': {message}")]
    LogFilter { value: String, message: String },
    #[error("telemetry error: {0}")]
    Telemetry(String),
    #[error(transparent)]
    Arguments(#[from] clap::Error),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    let command = match cli.command {
        Some(command) => command,
        None => Command::Serve(ServeArgs::implicit()?),
    };

    match command {
        Command::Serve(args) => run_server(&cli.config_dir, &cli.log_level, args).await,
        Command::Parameters(args) => print_parameters(&cli.config_dir, args),
    }
}

async fn run_server(
    config_dir: &Path,
    log_level: &str,
    args: ServeArgs,
) -> Result<(), CliError> {
    init_tracing(log_level)?;

    let config = ConfigLoader::load(config_dir)?;
    let router = create_router(AppState::new(config));

    let address = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %address, config_dir = %config_dir.display(), "Payroll engine listening");

    axum::serve(listener, router).await?;
    Ok(())
}

fn print_parameters(config_dir: &Path, args: ParametersArgs) -> Result<(), CliError> {
    let config = ConfigLoader::load(config_dir)?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let parameters = config.parameters_for(date)?;
    println!("{}", serde_json::to_string_pretty(parameters)?);
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<(), CliError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|err| CliError::LogFilter {
            value: log_level.to_string(),
            message: err.to_string(),
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| CliError::Telemetry(err.to_string()))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_binds_loopback_by_default() {
        let cli = Cli::try_parse_from(["nomina-engine", "serve"]).unwrap();
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.host, "127.0.0.1");
                assert_eq!(args.port, 8080);
            }
            other => panic!("Expected serve, got {:?}", other),
        }

        let implicit = ServeArgs::implicit().unwrap();
        assert_eq!(implicit.host, "127.0.0.1");
    }

    #[test]
    fn test_log_level_reads_environment() {
        let command = Cli::command();
        let log_level = command
            .get_arguments()
            .find(|arg| arg.get_id() == "log_level")
            .unwrap();
        assert_eq!(
            log_level.get_env().and_then(|env| env.to_str()),
            Some("NOMINA_LOG_LEVEL")
        );
        assert_eq!(log_level.get_long(), Some("log-level"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(" 2025-07-15 "),
            Ok(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap())
        );
        assert!(parse_date("15/07/2025").is_err());
    }
}
