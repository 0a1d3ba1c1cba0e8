//! Playback queue construction
//!
//! Expands a catalog entry into the flat, ordered list of items the player
//! should run through:
//! - movie: the movie itself
//! - show: the next-up episode chain, or every season in order
//! - season: all of its playable episodes
//! - episode: the episode plus follow-ups when the user auto-advances
//!
//! Intros are prepended when playback starts from the beginning.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::item::PlayableItemBuilder;
use super::subtitles::DEFAULT_FALLBACK_TITLE;
use crate::api::{Catalog, CatalogError, EpisodeQuery, ItemField};
use crate::models::{ticks_to_millis, CatalogEntry, EntryKind, EntryOrigin, PlayableItem};

/// Queue construction errors
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Catalog request failed: {0}")]
    Resolution(#[from] CatalogError),

    #[error("Media source {index} not available for item {item_id} ({available} sources)")]
    SourceIndexOutOfRange {
        item_id: String,
        index: usize,
        available: usize,
    },

    #[error("Media source {media_source_id} of item {item_id} has no stream path")]
    MissingLocator {
        item_id: String,
        media_source_id: String,
    },
}

/// Terminal state of one build request
#[derive(Debug, Clone)]
pub enum QueueResult {
    /// Items in play order; may be empty when nothing is playable
    Ready(Vec<PlayableItem>),
    Failed(Arc<QueueError>),
}

impl QueueResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, QueueResult::Ready(_))
    }

    /// Queued items, if the build succeeded
    pub fn items(&self) -> Option<&[PlayableItem]> {
        match self {
            QueueResult::Ready(items) => Some(items.as_slice()),
            QueueResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&QueueError> {
        match self {
            QueueResult::Ready(_) => None,
            QueueResult::Failed(e) => Some(&**e),
        }
    }
}

/// Queue policy knobs that aren't user preferences on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueOptions {
    /// Keep episodes the catalog lists but has no file for yet
    pub include_virtual_episodes: bool,
    pub subtitle_fallback_title: String,
    /// Catalog requests kept in flight by each fan-out step
    pub max_concurrent_requests: usize,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            include_virtual_episodes: true,
            subtitle_fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;

/// Expands catalog entries into playback queues
pub struct QueueBuilder {
    catalog: Arc<dyn Catalog>,
    items: PlayableItemBuilder,
    options: QueueOptions,
}

impl QueueBuilder {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self::with_options(catalog, QueueOptions::default())
    }

    pub fn with_options(catalog: Arc<dyn Catalog>, options: QueueOptions) -> Self {
        let items = PlayableItemBuilder::new(Arc::clone(&catalog))
            .with_fallback_title(options.subtitle_fallback_title.clone());
        Self {
            catalog,
            items,
            options,
        }
    }

    /// Build the queue for `entry`
    ///
    /// Never fails: any error along the way becomes [`QueueResult::Failed`].
    #[instrument(skip_all, fields(item_id = %entry.id, kind = %entry.kind))]
    pub async fn build(
        &self,
        entry: &CatalogEntry,
        start_position_ticks: i64,
        media_source_index: usize,
    ) -> QueueResult {
        match self
            .try_build(entry, start_position_ticks, media_source_index)
            .await
        {
            Ok(items) => {
                info!(count = items.len(), "playback queue ready");
                QueueResult::Ready(items)
            }
            Err(e) => {
                warn!(error = %e, "playback queue failed");
                QueueResult::Failed(Arc::new(e))
            }
        }
    }

    async fn try_build(
        &self,
        entry: &CatalogEntry,
        start_position_ticks: i64,
        media_source_index: usize,
    ) -> Result<Vec<PlayableItem>, QueueError> {
        let start_ms = ticks_to_millis(start_position_ticks);

        let intros = async {
            if start_ms <= 0 {
                self.intro_items(&entry.id).await
            } else {
                Ok(Vec::new())
            }
        };
        let (mut items, main) =
            futures::try_join!(intros, self.expand(entry, start_ms, media_source_index))?;

        items.extend(main);
        Ok(items)
    }

    async fn intro_items(&self, item_id: &str) -> Result<Vec<PlayableItem>, QueueError> {
        let intros: Vec<CatalogEntry> = self
            .catalog
            .intros(item_id)
            .await?
            .into_iter()
            .filter(CatalogEntry::has_sources)
            .collect();
        debug!(count = intros.len(), "resolved intros");

        self.in_order(
            intros
                .iter()
                .map(|intro| self.items.build(intro, 0, 0))
                .collect::<Vec<_>>()
                .into_iter(),
        )
        .await
    }

    async fn expand(
        &self,
        entry: &CatalogEntry,
        start_ms: i64,
        media_source_index: usize,
    ) -> Result<Vec<PlayableItem>, QueueError> {
        match &entry.kind {
            EntryKind::Movie => {
                let item = self
                    .items
                    .build(entry, media_source_index, start_ms)
                    .await?;
                Ok(vec![item])
            }
            EntryKind::Show => self.expand_show(entry, start_ms, media_source_index).await,
            EntryKind::Season { show_id, .. } => self.expand_season(show_id, &entry.id).await,
            EntryKind::Episode {
                show_id, season_id, ..
            } => {
                self.expand_episode(
                    entry,
                    show_id,
                    season_id.as_deref(),
                    start_ms,
                    media_source_index,
                )
                .await
            }
        }
    }

    async fn expand_show(
        &self,
        show: &CatalogEntry,
        start_ms: i64,
        media_source_index: usize,
    ) -> Result<Vec<PlayableItem>, QueueError> {
        let next_up = self.catalog.next_up(&show.id).await?;

        // Only the first suggestion matters
        if let Some(episode) = next_up.first() {
            debug!(episode_id = %episode.id, "continuing from next-up episode");
            let (show_id, season_id) = match &episode.kind {
                EntryKind::Episode {
                    show_id, season_id, ..
                } => (show_id.as_str(), season_id.as_deref()),
                _ => (show.id.as_str(), None),
            };
            return self
                .expand_episode(episode, show_id, season_id, start_ms, media_source_index)
                .await;
        }

        let seasons = self.catalog.seasons(&show.id).await?;
        debug!(count = seasons.len(), "no next-up, walking seasons");

        // List every season first, then build items, so each step stays bounded
        let per_season = self
            .in_order(
                seasons
                    .iter()
                    .map(|s| self.season_episodes(&show.id, &s.id))
                    .collect::<Vec<_>>()
                    .into_iter(),
            )
            .await?;
        let episodes: Vec<CatalogEntry> = per_season.into_iter().flatten().collect();

        self.in_order(
            episodes
                .iter()
                .map(|e| self.items.build(e, 0, 0))
                .collect::<Vec<_>>()
                .into_iter(),
        )
        .await
    }

    async fn expand_season(
        &self,
        show_id: &str,
        season_id: &str,
    ) -> Result<Vec<PlayableItem>, QueueError> {
        let episodes = self.season_episodes(show_id, season_id).await?;

        self.in_order(
            episodes
                .iter()
                .map(|e| self.items.build(e, 0, 0))
                .collect::<Vec<_>>()
                .into_iter(),
        )
        .await
    }

    /// Playable episodes of one season, in catalog order
    async fn season_episodes(
        &self,
        show_id: &str,
        season_id: &str,
    ) -> Result<Vec<CatalogEntry>, QueueError> {
        let query = EpisodeQuery::new(show_id)
            .season(Some(season_id.to_string()))
            .field(ItemField::MediaSources);
        Ok(self.playable(self.catalog.episodes(&query).await?))
    }

    async fn expand_episode(
        &self,
        episode: &CatalogEntry,
        show_id: &str,
        season_id: Option<&str>,
        start_ms: i64,
        media_source_index: usize,
    ) -> Result<Vec<PlayableItem>, QueueError> {
        let policy = self.catalog.playback_policy().await?;
        let limit = if policy.auto_advance { None } else { Some(1) };

        let query = EpisodeQuery::new(show_id)
            .season(season_id.map(str::to_string))
            .field(ItemField::MediaSources)
            .starting_at(episode.id.as_str())
            .limit(limit);
        let episodes = self.playable(self.catalog.episodes(&query).await?);

        self.in_order(
            episodes
                .iter()
                .map(|e| {
                    // Source choice and resume point belong to the requested episode only
                    if e.id == episode.id {
                        let source = match episode.origin {
                            EntryOrigin::Local => episode,
                            EntryOrigin::Remote => e,
                        };
                        self.items.build(source, media_source_index, start_ms)
                    } else {
                        self.items.build(e, 0, 0)
                    }
                })
                .collect::<Vec<_>>()
                .into_iter(),
        )
        .await
    }

    /// Run `tasks` with bounded concurrency, collecting results in input order
    ///
    /// Stops at the first error.
    async fn in_order<T, F>(&self, tasks: impl Iterator<Item = F>) -> Result<Vec<T>, QueueError>
    where
        F: Future<Output = Result<T, QueueError>>,
    {
        stream::iter(tasks)
            .buffered(self.options.max_concurrent_requests.max(1))
            .try_collect()
            .await
    }

    fn playable(&self, episodes: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
        let total = episodes.len();
        let playable: Vec<CatalogEntry> = episodes
            .into_iter()
            .filter(CatalogEntry::has_sources)
            .filter(|e| self.options.include_virtual_episodes || !e.is_virtual)
            .collect();
        if playable.len() < total {
            debug!(
                dropped = total - playable.len(),
                kept = playable.len(),
                "filtered unplayable episodes"
            );
        }
        playable
    }
}
