//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// task-cli - conversational task planner
#[derive(Parser)]
#[command(
    name = "task-cli",
    about = "AI-powered task planning assistant. Describe your task and get a structured plan.",
    version = env!("GIT_DESCRIBE"),
    arg_required_else_help = true
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a structured task plan through a short conversation
    #[command(after_help = "Examples:\n  \
        task-cli plan\n  \
        task-cli plan \"Build a REST API for user management\"\n  \
        task-cli plan -f json -o plan.json \"Migrate the database\"\n  \
        task-cli plan -s \"Write unit tests for login\"")]
    Plan {
        /// Initial task description. Prompted for when omitted.
        task: Option<String>,

        /// Output format for the generated plan
        #[arg(short, long, default_value = "markdown")]
        format: OutputFormat,

        /// Write output to a file instead of the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum clarifying questions to ask
        #[arg(short = 'q', long, value_parser = clap::value_parser!(u32).range(1..=10))]
        max_questions: Option<u32>,

        /// Skip clarifying questions and generate the plan immediately
        #[arg(short, long)]
        skip_questions: bool,

        /// Save the plan to the plans directory after generating
        #[arg(long)]
        save: bool,
    },

    /// Show current configuration (API key is masked)
    Config,

    /// List saved plans
    List,

    /// Load and display a saved plan
    Load {
        /// Filename of the plan to load (with or without .json)
        name: String,

        /// Output format
        #[arg(short, long, default_value = "markdown")]
        format: OutputFormat,
    },

    /// Show version information
    Version,
}

/// Output format for plans
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: markdown or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Path of the log file written by the binary
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("task-cli")
        .join("logs")
        .join("task-cli.log")
}
