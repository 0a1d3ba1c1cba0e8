//! Playable item construction
//!
//! Turns one catalog entry plus a media-source choice into the unit the
//! playback engine consumes.

use std::sync::Arc;
use tracing::debug;

use super::queue::QueueError;
use super::subtitles::SubtitleExtractor;
use crate::api::Catalog;
use crate::models::{CatalogEntry, EntryOrigin, MediaSource, PlayableItem, Protocol};

/// Builds [`PlayableItem`]s, re-resolving media sources when needed
pub struct PlayableItemBuilder {
    catalog: Arc<dyn Catalog>,
    subtitles: SubtitleExtractor,
}

impl PlayableItemBuilder {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        let subtitles = SubtitleExtractor::new(catalog.base_url());
        Self { catalog, subtitles }
    }

    /// Label untitled external subtitles with `title`
    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.subtitles = self.subtitles.with_fallback_title(title);
        self
    }

    /// Build the playable item for `entry` using its `media_source_index`-th source
    ///
    /// Local entries use their inline sources and paths. Remote entries have
    /// their sources fetched again; file-backed ones are left without a
    /// locator so the engine streams them by id.
    ///
    /// # Errors
    /// - `QueueError::SourceIndexOutOfRange` - no source at that index
    /// - `QueueError::Resolution` - the catalog call failed
    /// - `QueueError::MissingLocator` - an HTTP source came without a path
    pub async fn build(
        &self,
        entry: &CatalogEntry,
        media_source_index: usize,
        start_offset_ms: i64,
    ) -> Result<PlayableItem, QueueError> {
        let (source, locator) = match entry.origin {
            EntryOrigin::Local => {
                let source = select_source(entry, entry.media_sources.clone(), media_source_index)?;
                let locator = source.path.clone();
                (source, locator)
            }
            EntryOrigin::Remote => {
                let sources = self.catalog.media_sources(&entry.id).await?;
                let source = select_source(entry, sources, media_source_index)?;
                let locator = match source.protocol {
                    Protocol::Http => Some(source.path.clone().ok_or_else(|| {
                        QueueError::MissingLocator {
                            item_id: entry.id.clone(),
                            media_source_id: source.id.clone(),
                        }
                    })?),
                    // File and anything exotic: the engine resolves by id
                    _ => None,
                };
                (source, locator)
            }
        };

        debug!(
            item_id = %entry.id,
            media_source_id = %source.id,
            protocol = ?source.protocol,
            "built playable item"
        );

        let (season_index, episode_index) = entry.kind.episode_ordinals();
        Ok(PlayableItem {
            name: entry.name.clone(),
            item_id: entry.id.clone(),
            media_source_id: source.id.clone(),
            locator,
            start_offset_ms,
            season_index,
            episode_index,
            external_subtitles: self.subtitles.extract(&source),
        })
    }
}

fn select_source(
    entry: &CatalogEntry,
    sources: Vec<MediaSource>,
    index: usize,
) -> Result<MediaSource, QueueError> {
    let available = sources.len();
    sources
        .into_iter()
        .nth(index)
        .ok_or_else(|| QueueError::SourceIndexOutOfRange {
            item_id: entry.id.clone(),
            index,
            available,
        })
}
