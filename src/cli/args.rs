//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::analyze::AnalyzeArgs;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::new::NewArgs;
use crate::cli::commands::report::ReportArgs;
use crate::cli::commands::row::RowCommands;
use crate::cli::commands::setup::SetupCommands;
use crate::cli::commands::tol::TolArgs;
use crate::cli::commands::transfer::{ExportArgs, ImportArgs};

/// Tolerance stack-up calculator
#[derive(Parser, Debug)]
#[command(name = "tolstack", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,

    /// Stack file to operate on [default: stack.json]
    #[arg(long = "file", short = 'F', global = true, env = "TOLSTACK_FILE")]
    pub file: Option<PathBuf>,

    /// Log more detail to stderr (repeat for trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Styled text for terminals
    #[default]
    Auto,
    Json,
    Yaml,
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new stack file
    New(NewArgs),

    /// Show the stack's setup and contributors
    Show,

    /// Run worst-case, RSS and capability analysis
    Analyze(AnalyzeArgs),

    /// Rank contributors by share of stack variance
    Pareto,

    /// Add, edit, remove or reorder contributors
    #[command(subcommand)]
    Row(RowCommands),

    /// Edit spec limits, acceptance criterion, mode and metadata
    #[command(subcommand)]
    Setup(SetupCommands),

    /// Normalize a single tolerance entry
    Tol(TolArgs),

    /// Load contributors from a CSV file
    Import(ImportArgs),

    /// Write contributors to a CSV file
    Export(ExportArgs),

    /// Render a Markdown analysis report
    Report(ReportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
