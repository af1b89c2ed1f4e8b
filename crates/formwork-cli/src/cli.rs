//! Command-line interface for `formwork`.
//!
//! # Examples
//!
//! ```bash
//! # Print the default value tree of a form
//! formwork defaults forms/user.json
//!
//! # Render a form filled with some values
//! formwork render forms/user.json --values filled.json
//!
//! # Validate a payload as JSON
//! formwork --format json validate forms/user.json payload.json
//!
//! # Replay scripted inputs, then submit
//! formwork replay forms/user.json inputs.txt
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Formwork - schema-driven forms from the command line.
///
/// Loads a form description (JSON or YAML), then prints its defaults,
/// renders it, validates a payload against it, or replays scripted input.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "formwork",
    author,
    version,
    about = "Render, validate and replay schema-driven forms",
    long_about = "Loads a form description written in JSON or YAML and drives the \
                  form engine: defaults, rendering, validation and scripted input."
)]
pub struct Cli {
    /// Output format
    #[arg(
        long,
        short = 'f',
        value_enum,
        default_value_t,
        env = "FORMWORK_FORMAT",
        global = true
    )]
    pub format: OutputFormat,

    /// Force color output off
    ///
    /// Also set by the `NO_COLOR` environment variable
    #[arg(long, env = "NO_COLOR", global = true)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// What to do with the form
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the default value tree
    Defaults(FormArgs),

    /// Render the form
    Render(RenderArgs),

    /// Validate a payload against the form
    Validate(ValidateArgs),

    /// Apply scripted inputs, then submit
    Replay(ReplayArgs),
}

impl Command {
    /// The form description file every subcommand reads.
    #[must_use]
    pub const fn form(&self) -> &PathBuf {
        match self {
            Self::Defaults(args) => &args.form,
            Self::Render(args) => &args.form,
            Self::Validate(args) => &args.form,
            Self::Replay(args) => &args.form,
        }
    }
}

/// Arguments naming only the form.
#[derive(Parser, Debug, Clone)]
pub struct FormArgs {
    /// Form description file (`.json`, `.yaml` or `.yml`)
    pub form: PathBuf,
}

/// Arguments for the render subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    /// Form description file
    pub form: PathBuf,

    /// Values to load before rendering
    #[arg(long)]
    pub values: Option<PathBuf>,

    /// Validate before rendering so field errors are shown
    #[arg(long)]
    pub show_errors: bool,
}

/// Arguments for the validate subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Form description file
    pub form: PathBuf,

    /// JSON payload to check
    pub payload: PathBuf,
}

/// Arguments for the replay subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ReplayArgs {
    /// Form description file
    pub form: PathBuf,

    /// Input script, one step per line
    ///
    /// Steps: `set <path> <json or text>`, `clear <path>`, `add <path>`,
    /// `remove <path> <index>`. Blank lines and `#` comments are skipped.
    pub script: PathBuf,

    /// Print the rendered form after the last step
    #[arg(long)]
    pub render: bool,
}

/// Output formats.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl Cli {
    /// Parse command line arguments.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create CLI from iterator (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if argument parsing fails.
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Get log level based on verbosity.
    #[must_use]
    pub const fn log_level(&self) -> LogLevel {
        match self.verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Log level for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only show warnings and errors
    Warn,
    /// Show info messages
    Info,
    /// Show debug messages
    Debug,
    /// Show all messages including trace
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}
