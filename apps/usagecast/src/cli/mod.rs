//! # Usagecast CLI Module
//!
//! ## Available Commands
//!
//! - `project` - Project a fact file into the selected models
//! - `keys` - Print the keys derived from each fact
//! - `fingerprint` - Checksum every model of a run
//! - `export` - Write one model in canonical binary form
//! - `inspect` - Verify a canonical export and print its header

mod commands;

use crate::config::{AppConfig, InputFormat};
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use usagecast_core::Model;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Usagecast - usage fact serialization engine
///
/// Projects table usage facts into graph, relational and catalog units
/// with stable upsert keys.
#[derive(Parser, Debug)]
#[command(name = "usagecast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (default: ./usagecast.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress the closing summary
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Project facts into graph, relational and catalog units
    Project {
        /// Path to the fact file
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (json, jsonl)
        #[arg(short = 't', long)]
        format: Option<InputFormat>,

        /// Models to project (comma-separated: graph,relational,catalog)
        #[arg(short, long, value_delimiter = ',')]
        models: Vec<Model>,

        /// Directory for per-sequence JSON Lines files (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit each user node / user row only once
        #[arg(long)]
        dedup_users: bool,
    },

    /// Print the entity, user and reader keys of each fact
    Keys {
        /// Path to the fact file
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (json, jsonl)
        #[arg(short = 't', long)]
        format: Option<InputFormat>,
    },

    /// Compute per-model checksums and BLAKE3 hashes of a run
    Fingerprint {
        /// Path to the fact file
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (json, jsonl)
        #[arg(short = 't', long)]
        format: Option<InputFormat>,
    },

    /// Export one model in canonical binary form
    Export {
        /// Path to the fact file
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (json, jsonl)
        #[arg(short = 't', long)]
        format: Option<InputFormat>,

        /// Model to export
        #[arg(short, long)]
        model: Model,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Verify a canonical export and print its header
    Inspect {
        /// Canonical export file
        #[arg(short, long)]
        file: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let output = OutputMode {
        json: cli.json_mode,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Project {
            input,
            format,
            models,
            output: dir,
            dedup_users,
        } => {
            let request = ProjectRequest {
                format: format.unwrap_or(config.input.format),
                models: if models.is_empty() {
                    config.output.models
                } else {
                    models
                },
                dir: dir.or(config.output.dir),
                options: usagecast_core::ProjectionOptions {
                    dedup_users: dedup_users || config.projection.dedup_users,
                },
            };
            cmd_project(&input, &request, output)
        }
        Commands::Keys { input, format } => {
            cmd_keys(&input, format.unwrap_or(config.input.format), output)
        }
        Commands::Fingerprint { input, format } => {
            cmd_fingerprint(&input, format.unwrap_or(config.input.format), output)
        }
        Commands::Export {
            input,
            format,
            model,
            output: path,
        } => cmd_export(
            &input,
            format.unwrap_or(config.input.format),
            model,
            &path,
            output,
        ),
        Commands::Inspect { file } => cmd_inspect(&file, output),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn project_parses_model_list() {
        let cli = Cli::try_parse_from([
            "usagecast",
            "project",
            "-i",
            "facts.json",
            "--models",
            "graph,catalog",
            "--dedup-users",
        ])
        .expect("parse");

        let Commands::Project {
            models,
            dedup_users,
            format,
            ..
        } = cli.command
        else {
            unreachable!("parsed as project");
        };
        assert_eq!(models, vec![Model::Graph, Model::Catalog]);
        assert!(dedup_users);
        assert!(format.is_none());
    }

    #[test]
    fn unknown_model_is_rejected() {
        assert!(
            Cli::try_parse_from(["usagecast", "project", "-i", "f.json", "-m", "document"])
                .is_err()
        );
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["usagecast", "inspect", "-f", "out.bin", "--json-mode"])
            .expect("parse");
        assert!(cli.json_mode);
    }
}
