//! Runtime configuration for `formwork`.
//!
//! [`Config`] holds every runtime toggle once it has been resolved from
//! command-line flags and environment variables, so the rest of the binary
//! never looks at [`Cli`] directly.

use serde::{Deserialize, Serialize};

use crate::cli::{Cli, LogLevel, OutputFormat};

/// Runtime configuration of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    // ========================================================================
    // Output Settings
    // ========================================================================
    /// How results are printed.
    pub format: OutputFormat,

    /// Whether the text view may use ANSI colors.
    pub color: bool,

    // ========================================================================
    // Logging Settings
    // ========================================================================
    /// Level used when `RUST_LOG` is not set.
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
            log_level: LogLevel::Warn,
        }
    }
}

impl Config {
    /// Create configuration from CLI arguments.
    #[must_use]
    pub const fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            color: !cli.no_color,
            log_level: cli.log_level(),
        }
    }

    /// Check if JSON output was requested.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = Config::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.color);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(!config.is_json());
    }

    #[test]
    fn config_from_cli() {
        let cli = Cli::try_parse_from([
            "formwork",
            "-vv",
            "--format",
            "json",
            "--no-color",
            "defaults",
            "form.json",
        ])
        .unwrap();
        let config = Config::from_cli(&cli);

        assert!(config.is_json());
        assert!(!config.color);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn config_serializes() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"format":"text","color":true,"log_level":"warn"}"#);

        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
