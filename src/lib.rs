//! jellyqueue - playback queues for Jellyfin libraries
//!
//! Turns a movie, show, season or episode from a media library into the
//! flat, ordered list of playable items a player should run through,
//! with intros, media-source selection, external subtitles and
//! auto-advance to following episodes.
//!
//! # Modules
//!
//! - `models` - Catalog entries, media sources, playable items
//! - `api` - Catalog contract and the Jellyfin client
//! - `playback` - Subtitle extraction, item building, queue building
//! - `config` - Config file and credentials
//! - `cli` / `commands` - Command line surface

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod playback;

// Re-export commonly used types
pub use models::{
    CatalogEntry, EntryKind, EntryOrigin, ExternalSubtitle, MediaSource, MediaStream,
    PlayableItem, Protocol, StreamKind, SubtitleFormat, UserPlaybackPolicy,
};

pub use api::{Catalog, CatalogError, EpisodeQuery, ItemField, JellyfinClient};
pub use playback::{QueueBuilder, QueueController, QueueError, QueueOptions, QueueResult};
