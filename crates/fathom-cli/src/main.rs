#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "fathom: latent-signal detectors over citation-tagged facts",
    long_about = None
)]
struct Cli {
    /// Output format (default: pretty on a terminal, text when piped).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Analysis config file (default: ./fathom.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Run detectors over a fact bundle",
        long_about = "Build the co-occurrence graph, digit tests and timeline from a fact bundle and emit cited findings.",
        after_help = "EXAMPLES:\n    # Run every detector\n    fathom analyze --input facts.json\n\n    # Only the timeline, as JSON\n    fathom analyze --input facts.json --detector silence --format json\n\n    # Read the bundle from stdin\n    extract corpus/ | fathom analyze --input -"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Inspect analysis configuration",
        after_help = "EXAMPLES:\n    # Show the effective config as TOML\n    fathom config show\n\n    # Print the built-in defaults\n    fathom config show --defaults"
    )]
    Config(cmd::config::ConfigArgs),
}

/// Logs go to stderr so stdout stays clean for results.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("FATHOM_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "fathom=debug,info"
        } else {
            "fathom=info,warn"
        })
    });

    let format = env::var("FATHOM_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let working_dir = env::current_dir()?;
    let output = resolve_output_mode(cli.format, cli.json);
    let config_path = cli.config.as_deref();

    let command_result = match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, config_path, &working_dir, output),
        Commands::Config(args) => cmd::config::run_config(args, config_path, &working_dir, output),
    };

    if let Err(err) = command_result {
        tracing::debug!(error = ?err, "command failed");
        render_error(output, &CliError::from(&err))?;
        std::process::exit(1);
    }
    Ok(())
}
