mod check;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use locale_core::{Config, LocaleError};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Factorio locale file toolchain.
#[derive(Parser)]
#[command(name = "locale", version, about = "Factorio locale file toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Configuration file (defaults to ./locale.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate locale files and report diagnostics
    Check {
        /// Locale files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Start the Language Server Protocol server over stdio
    Lsp,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e.to_string(), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Check { paths } => {
            check::cmd_check(&paths, &config, cli.output, cli.quiet);
        }
        Commands::Lsp => {
            if let Err(e) = locale_lsp::run(config) {
                eprintln!("LSP server error: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Log to stderr; stdout carries command output or the LSP transport.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config, LocaleError> {
    match path {
        Some(path) => Config::load(path),
        None => {
            let cwd = std::env::current_dir().map_err(|e| LocaleError::io(".", e))?;
            Config::discover(&cwd)
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
