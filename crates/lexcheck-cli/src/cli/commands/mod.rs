//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod health;
mod kinds;
mod render;
mod upload;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lexcheck::{load_settings, LoadOptions};

use super::helpers::OutputFormat;

#[derive(Parser)]
#[command(name = "lexcheck")]
#[command(about = "Upload legal documents and run AI contract analyses")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "LEXCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Backend API URL (overrides config file)
    #[arg(long, global = true, env = "LEXCHECK_API_URL")]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// List the available analysis kinds
    Kinds,

    /// Check that the backend is reachable
    Health,

    /// Upload a document and show the extracted text summary
    Upload {
        /// Document to upload (txt, pdf, doc, docx)
        file: PathBuf,
        /// Print the extracted document content
        #[arg(long)]
        show_content: bool,
    },

    /// Upload a document, run an analysis and write the result
    Analyze {
        /// Document to analyze (txt, pdf, doc, docx)
        file: PathBuf,
        /// Analysis kind ID (see `lexcheck kinds`)
        #[arg(short, long, default_value = "contract_review")]
        kind: String,
        /// Question for custom analyses
        #[arg(short, long)]
        query: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "html")]
        format: OutputFormat,
        /// Output file (defaults to a timestamped file in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Upload retries on transient failures (overrides config)
        #[arg(long)]
        retries: Option<u32>,
    },

    /// Format a saved raw analysis result without contacting the backend
    Render {
        /// JSON file holding the raw result
        result: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "html")]
        format: OutputFormat,
        /// Output file (defaults to a timestamped file in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        api_url: cli.api_url,
    };
    let (settings, _config) = load_settings(options).await?;

    match cli.command {
        Commands::Kinds => kinds::cmd_kinds().await,
        Commands::Health => health::cmd_health(&settings).await,
        Commands::Upload { file, show_content } => {
            upload::cmd_upload(&settings, &file, show_content).await
        }
        Commands::Analyze {
            file,
            kind,
            query,
            format,
            output,
            retries,
        } => {
            analyze::cmd_analyze(
                &settings,
                &file,
                &kind,
                query.as_deref(),
                format,
                output.as_deref(),
                retries.unwrap_or(settings.upload_retries),
            )
            .await
        }
        Commands::Render {
            result,
            format,
            output,
        } => render::cmd_render(&settings, &result, format, output.as_deref()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_args() {
        let cli = Cli::try_parse_from([
            "lexcheck",
            "analyze",
            "lease.pdf",
            "--kind",
            "custom_analysis",
            "--query",
            "Who pays?",
            "--format",
            "markdown",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Analyze {
                kind,
                query,
                format,
                retries,
                ..
            } => {
                assert_eq!(kind, "custom_analysis");
                assert_eq!(query.as_deref(), Some("Who pays?"));
                assert_eq!(format, OutputFormat::Markdown);
                assert_eq!(retries, None);
            }
            _ => panic!("expected analyze"),
        }
    }
}
