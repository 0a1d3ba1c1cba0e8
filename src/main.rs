//! jellyqueue - playback queues for Jellyfin libraries
//!
//! Expands a library item into the ordered list of things a player should
//! run through: intros, the item itself, follow-up episodes.
//!
//! # Usage
//!
//! ```bash
//! jellyqueue queue 5b2a1c0e9d3f4e8a9b7c6d5e4f3a2b1c
//! jellyqueue subtitles 5b2a1c0e9d3f4e8a9b7c6d5e4f3a2b1c --lang eng --json
//! ```

use clap::Parser;

use jellyqueue::cli::{self, Cli, Command, ExitCode, Output};
use jellyqueue::{commands, logging};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_level.into());

    run_cli(cli).await.into()
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);
    let config = cli.config.as_deref();

    match cli.command {
        Command::Queue(cmd) => {
            if let Err(e) = cli::validate_item_id(&cmd.item_id) {
                return output.error(e, ExitCode::InvalidArgs);
            }
            commands::queue_cmd(cmd, config, &output).await
        }

        Command::Subtitles(cmd) => {
            if let Err(e) = cli::validate_item_id(&cmd.item_id) {
                return output.error(e, ExitCode::InvalidArgs);
            }
            commands::subtitles_cmd(cmd, config, &output).await
        }
    }
}
