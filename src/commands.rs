//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the catalog client and the
//! playback pipeline. Each handler takes CLI args and Output, returns ExitCode.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

use crate::api::{Catalog, JellyfinClient};
use crate::cli::{
    ExitCode, Output, QueueCmd, QueueResponse, SubtitlesCmd, SubtitlesResponse,
};
use crate::config::Config;
use crate::playback::{QueueBuilder, QueueController, QueueResult, SubtitleExtractor};

/// Load config from `--config` or the default location
fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(p) => Config::load_from(p),
        None => Config::load(),
    }
}

/// Connect to the configured server
fn connect(config: &mut Config) -> anyhow::Result<JellyfinClient> {
    let settings = config
        .server_settings()
        .context("Server connection is not configured")?;
    Ok(JellyfinClient::new(settings))
}

// =============================================================================
// Queue Command
// =============================================================================

pub async fn queue_cmd(cmd: QueueCmd, config_path: Option<&Path>, output: &Output) -> ExitCode {
    let mut config = load_config(config_path);
    let client = match connect(&mut config) {
        Ok(client) => Arc::new(client),
        Err(e) => return output.error(format!("{:#}", e), ExitCode::ConfigError),
    };

    let mut entry = match client.item(&cmd.item_id).await {
        Ok(entry) => entry,
        Err(e) => {
            return output.error(
                format!("Failed to load item {}: {}", cmd.item_id, e),
                ExitCode::NetworkError,
            )
        }
    };
    if let Some(ticks) = cmd.start_override() {
        entry.playback_position_ticks = ticks;
    }

    output.info(format!("Building queue for: {}", entry));

    let catalog: Arc<dyn Catalog> = client;
    let builder = QueueBuilder::with_options(catalog, config.queue_options());
    let mut controller = QueueController::new(builder);
    let mut results = controller.subscribe();

    let item_id = entry.id.clone();
    let name = entry.name.clone();
    controller.request_build(entry, cmd.source_index);

    match results.next().await {
        Some(QueueResult::Ready(items)) if items.is_empty() => {
            output.error("Nothing to play", ExitCode::NothingToPlay)
        }
        Some(QueueResult::Ready(items)) => {
            for item in &items {
                output.info(format!("  {}", item));
            }
            let response = QueueResponse {
                item_id,
                name,
                items,
            };
            if let Err(e) = output.print(&response) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Some(QueueResult::Failed(e)) => {
            output.error(format!("Queue build failed: {}", e), ExitCode::NetworkError)
        }
        None => output.error("Queue build was cancelled", ExitCode::Error),
    }
}

// =============================================================================
// Subtitles Command
// =============================================================================

pub async fn subtitles_cmd(
    cmd: SubtitlesCmd,
    config_path: Option<&Path>,
    output: &Output,
) -> ExitCode {
    let mut config = load_config(config_path);
    let client = match connect(&mut config) {
        Ok(client) => client,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::ConfigError),
    };

    output.info(format!("Resolving media sources for: {}", cmd.item_id));

    let sources = match client.media_sources(&cmd.item_id).await {
        Ok(sources) => sources,
        Err(e) => {
            return output.error(
                format!("Failed to resolve media sources: {}", e),
                ExitCode::NetworkError,
            )
        }
    };

    let available = sources.len();
    let Some(source) = sources.into_iter().nth(cmd.source_index) else {
        return output.error(
            format!(
                "Media source {} not available ({} sources)",
                cmd.source_index, available
            ),
            ExitCode::InvalidArgs,
        );
    };

    let mut extractor = SubtitleExtractor::new(client.base_url());
    if let Some(title) = config.subtitle_fallback_title.clone() {
        extractor = extractor.with_fallback_title(title);
    }

    let langs = cmd.languages();
    let subtitles = extractor
        .extract(&source)
        .into_iter()
        .filter(|s| {
            langs.is_empty() || langs.iter().any(|lang| s.language.eq_ignore_ascii_case(lang))
        })
        .collect();

    let response = SubtitlesResponse {
        item_id: cmd.item_id,
        media_source_id: source.id,
        subtitles,
    };
    if let Err(e) = output.print(&response) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}
