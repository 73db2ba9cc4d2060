use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use fathom_core::config::{AnalysisConfig, CONFIG_FILE_NAME, resolve_config};
use std::path::Path;

use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show the effective configuration
    Show(ShowArgs),
    /// Validate a config file without running anything
    Check,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Print the built-in defaults, ignoring any config file
    #[arg(long)]
    defaults: bool,
}

pub fn run_config(
    args: &ConfigArgs,
    config_path: Option<&Path>,
    working_dir: &Path,
    output: OutputMode,
) -> Result<()> {
    match &args.command {
        ConfigCommand::Show(show) => {
            let config = if show.defaults {
                AnalysisConfig::default()
            } else {
                resolve_config(config_path, working_dir).context("resolving analysis config")?
            };
            print_effective(&config, output)
        }
        ConfigCommand::Check => {
            resolve_config(config_path, working_dir).context("resolving analysis config")?;
            let source = config_path.map_or_else(
                || {
                    let implicit = working_dir.join(CONFIG_FILE_NAME);
                    if implicit.exists() {
                        implicit.display().to_string()
                    } else {
                        "built-in defaults".to_string()
                    }
                },
                |p| p.display().to_string(),
            );
            if output.is_json() {
                println!("{}", serde_json::json!({"valid": true, "source": source}));
            } else {
                println!("ok: {source}");
            }
            Ok(())
        }
    }
}

fn print_effective(value: &AnalysisConfig, output: OutputMode) -> Result<()> {
    match output {
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputMode::Text | OutputMode::Pretty => {
            print!("{}", toml::to_string_pretty(value)?);
        }
    }
    Ok(())
}
