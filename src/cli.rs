//! CLI - Command Line Interface for jellyqueue
//!
//! Scriptable access to the playback queue builder. All output is
//! JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Build the queue for a show (next-up or full run)
//! jellyqueue queue 5b2a1c0e9d3f4e8a9b7c6d5e4f3a2b1c
//!
//! # Resume an episode with its second media source
//! jellyqueue queue 0f1e2d3c4b5a69788796a5b4c3d2e1f0 --source-index 1
//!
//! # List side-loadable subtitles
//! jellyqueue subtitles 0f1e2d3c4b5a69788796a5b4c3d2e1f0 --json
//! ```

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::logging::CliLogLevel;
use crate::models::{ExternalSubtitle, PlayableItem};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Catalog request failed
    NetworkError = 3,
    /// Queue built but nothing in it is playable
    NothingToPlay = 4,
    /// Missing or broken configuration
    ConfigError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// jellyqueue - playback queues for Jellyfin libraries
#[derive(Parser, Debug)]
#[command(
    name = "jellyqueue",
    version,
    about = "Build playback queues for Jellyfin library items",
    long_about = "Expands a movie, show, season or episode into the ordered list \
                  of playable items a player should run through, including intros, \
                  follow-up episodes and external subtitles.",
    after_help = "EXAMPLES:\n\
                  jellyqueue queue <ITEM_ID>                 Build a playback queue\n\
                  jellyqueue queue <ITEM_ID> --from-start    Ignore the resume point\n\
                  jellyqueue subtitles <ITEM_ID> --json      List external subtitles"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: CliLogLevel,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the playback queue for an item
    #[command(visible_alias = "q")]
    Queue(QueueCmd),

    /// List external subtitles of an item's media source
    #[command(visible_alias = "sub")]
    Subtitles(SubtitlesCmd),
}

// =============================================================================
// Queue Command
// =============================================================================

/// Build the playback queue for a movie, show, season or episode
#[derive(Args, Debug)]
pub struct QueueCmd {
    /// Library item id
    #[arg(required = true)]
    pub item_id: String,

    /// Media source to play for the requested item
    #[arg(long, short = 'i')]
    pub source_index: Option<usize>,

    /// Ignore the saved resume position (plays intros)
    #[arg(long, conflicts_with = "start_ticks")]
    pub from_start: bool,

    /// Start position in catalog ticks (100ns)
    #[arg(long)]
    pub start_ticks: Option<i64>,
}

impl QueueCmd {
    /// Start position override, if any
    pub fn start_override(&self) -> Option<i64> {
        if self.from_start {
            Some(0)
        } else {
            self.start_ticks
        }
    }
}

// =============================================================================
// Subtitles Command
// =============================================================================

/// List side-loadable subtitles for an item
#[derive(Args, Debug)]
pub struct SubtitlesCmd {
    /// Library item id
    #[arg(required = true)]
    pub item_id: String,

    /// Media source to inspect
    #[arg(long, short = 'i', default_value = "0")]
    pub source_index: usize,

    /// Only show these languages, comma-separated (e.g. "eng,spa")
    #[arg(long, short = 'l')]
    pub lang: Option<String>,
}

impl SubtitlesCmd {
    /// Parse language codes into a vector
    pub fn languages(&self) -> Vec<&str> {
        self.lang
            .as_deref()
            .map(|l| l.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Queue build response
#[derive(Debug, Serialize, Deserialize)]
pub struct QueueResponse {
    pub item_id: String,
    pub name: String,
    pub items: Vec<PlayableItem>,
}

/// Subtitle listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct SubtitlesResponse {
    pub item_id: String,
    pub media_source_id: String,
    pub subtitles: Vec<ExternalSubtitle>,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Item ID Validation
// =============================================================================

/// Validate a library item id (32 hex digits, dashes allowed)
pub fn validate_item_id(id: &str) -> Result<&str, &'static str> {
    let digits: Vec<char> = id.chars().filter(|c| *c != '-').collect();
    if digits.len() == 32 && digits.iter().all(|c| c.is_ascii_hexdigit()) {
        Ok(id)
    } else {
        Err("Invalid item id (expected 32 hex digits)")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_queue_start_override() {
        let cli = Cli::parse_from(["jellyqueue", "queue", "abc", "--from-start"]);
        let Command::Queue(cmd) = cli.command else {
            panic!("Expected Queue command");
        };
        assert_eq!(cmd.start_override(), Some(0));

        let cli = Cli::parse_from(["jellyqueue", "queue", "abc", "--start-ticks", "600000000"]);
        let Command::Queue(cmd) = cli.command else {
            panic!("Expected Queue command");
        };
        assert_eq!(cmd.start_override(), Some(600_000_000));

        let cli = Cli::parse_from(["jellyqueue", "queue", "abc"]);
        let Command::Queue(cmd) = cli.command else {
            panic!("Expected Queue command");
        };
        assert_eq!(cmd.start_override(), None);
    }

    #[test]
    fn test_from_start_conflicts_with_ticks() {
        let result = Cli::try_parse_from([
            "jellyqueue",
            "queue",
            "abc",
            "--from-start",
            "--start-ticks",
            "5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id("5b2a1c0e9d3f4e8a9b7c6d5e4f3a2b1c").is_ok());
        assert!(validate_item_id("5b2a1c0e-9d3f-4e8a-9b7c-6d5e4f3a2b1c").is_ok());
        assert!(validate_item_id("5b2a1c0e9d3f").is_err()); // too short
        assert!(validate_item_id("zz2a1c0e9d3f4e8a9b7c6d5e4f3a2b1c").is_err()); // not hex
    }

    #[test]
    fn test_subtitles_languages() {
        let cmd = SubtitlesCmd {
            item_id: "abc".to_string(),
            source_index: 0,
            lang: Some("eng, spa,".to_string()),
        };
        assert_eq!(cmd.languages(), vec!["eng", "spa"]);

        let cmd = SubtitlesCmd {
            item_id: "abc".to_string(),
            source_index: 0,
            lang: None,
        };
        assert!(cmd.languages().is_empty());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::Error), 1);
        assert_eq!(i32::from(ExitCode::InvalidArgs), 2);
        assert_eq!(i32::from(ExitCode::NetworkError), 3);
        assert_eq!(i32::from(ExitCode::NothingToPlay), 4);
        assert_eq!(i32::from(ExitCode::ConfigError), 5);
    }
}
