//! Data structures and types for jellyqueue
//!
//! Contains all shared models used across the crate organized by domain:
//! - **Catalog**: library entries (movie, show, season, episode) and their media sources
//! - **Streams**: tracks inside a media source and the subtitle formats we understand
//! - **Playback**: playable items pushed into the playback queue

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog positions and durations are expressed in 100ns ticks.
pub const TICKS_PER_MILLISECOND: i64 = 10_000;

/// Convert catalog ticks to milliseconds
pub fn ticks_to_millis(ticks: i64) -> i64 {
    ticks / TICKS_PER_MILLISECOND
}

// =============================================================================
// Catalog Models
// =============================================================================

/// Kind of library node, with the variant-specific fields each kind carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntryKind {
    Movie,
    Show,
    Season {
        show_id: String,
        season_index: Option<i32>,
    },
    Episode {
        show_id: String,
        season_id: Option<String>,
        season_index: Option<i32>,
        episode_index: Option<i32>,
    },
}

impl EntryKind {
    /// Season/episode ordinals, only defined for episodes
    pub fn episode_ordinals(&self) -> (Option<i32>, Option<i32>) {
        match self {
            EntryKind::Episode {
                season_index,
                episode_index,
                ..
            } => (*season_index, *episode_index),
            _ => (None, None),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Movie => write!(f, "Movie"),
            EntryKind::Show => write!(f, "Show"),
            EntryKind::Season { .. } => write!(f, "Season"),
            EntryKind::Episode { .. } => write!(f, "Episode"),
        }
    }
}

/// Where an entry's media sources come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrigin {
    /// Known to the catalog service; sources are re-resolved by id
    #[default]
    Remote,
    /// Sources carried inline are authoritative (e.g. downloaded media)
    Local,
}

/// A node of the media library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub kind: EntryKind,
    #[serde(default)]
    pub media_sources: Vec<MediaSource>,
    /// Resume position reported by the catalog, in ticks
    #[serde(default)]
    pub playback_position_ticks: i64,
    #[serde(default)]
    pub origin: EntryOrigin,
    /// Listed by the catalog but not present on disk (not yet aired)
    #[serde(default)]
    pub is_virtual: bool,
}

impl CatalogEntry {
    /// Whether the entry has at least one media source to play
    pub fn has_sources(&self) -> bool {
        !self.media_sources.is_empty()
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EntryKind::Episode {
                season_index: Some(season),
                episode_index: Some(episode),
                ..
            } => write!(f, "S{:02}E{:02} - {}", season, episode, self.name),
            kind => write!(f, "{} [{}]", self.name, kind),
        }
    }
}

/// Transport a media source is delivered over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Protocol {
    #[default]
    File,
    Http,
    Rtmp,
    Rtsp,
    Udp,
    Rtp,
    Ftp,
    #[serde(other)]
    Unknown,
}

/// One concrete playable rendition of an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSource {
    pub id: String,
    pub path: Option<String>,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub streams: Vec<MediaStream>,
}

// =============================================================================
// Stream Models
// =============================================================================

/// Track type within a media source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    Audio,
    Video,
    Subtitle,
    EmbeddedImage,
    Data,
    Lyric,
    #[serde(other)]
    Unknown,
}

/// A track within a media source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStream {
    pub kind: StreamKind,
    #[serde(default)]
    pub is_external: bool,
    pub delivery_url: Option<String>,
    pub codec: Option<String>,
    pub language: Option<String>,
    pub title: Option<String>,
}

/// Subtitle formats the playback engine can load side-by-side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtitleFormat {
    SubRip,
    WebVtt,
    Ssa,
    Unknown,
}

impl SubtitleFormat {
    /// Map a catalog codec identifier to a format
    pub fn from_codec(codec: Option<&str>) -> Self {
        match codec.map(|c| c.to_ascii_lowercase()).as_deref() {
            Some("subrip") => SubtitleFormat::SubRip,
            Some("webvtt") => SubtitleFormat::WebVtt,
            Some("ass") => SubtitleFormat::Ssa,
            _ => SubtitleFormat::Unknown,
        }
    }

    /// MIME type handed to the playback engine
    pub fn mime_type(&self) -> &'static str {
        match self {
            SubtitleFormat::SubRip => "application/x-subrip",
            SubtitleFormat::WebVtt => "text/vtt",
            SubtitleFormat::Ssa => "text/x-ssa",
            SubtitleFormat::Unknown => "text/x-unknown",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubtitleFormat::SubRip => write!(f, "SRT"),
            SubtitleFormat::WebVtt => write!(f, "WebVTT"),
            SubtitleFormat::Ssa => write!(f, "SSA"),
            SubtitleFormat::Unknown => write!(f, "???"),
        }
    }
}

/// Side-loaded subtitle track with an absolute URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSubtitle {
    pub title: String,
    /// Language tag, empty when the catalog doesn't know it
    pub language: String,
    pub url: String,
    pub format: SubtitleFormat,
}

impl fmt::Display for ExternalSubtitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.language.is_empty() {
            write!(f, "{} ({})", self.title, self.format)
        } else {
            write!(f, "[{}] {} ({})", self.language, self.title, self.format)
        }
    }
}

// =============================================================================
// Playback Models
// =============================================================================

/// User-level playback preferences from the catalog service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPlaybackPolicy {
    pub auto_advance: bool,
}

impl Default for UserPlaybackPolicy {
    fn default() -> Self {
        Self { auto_advance: true }
    }
}

/// One entry of the playback queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayableItem {
    pub name: String,
    pub item_id: String,
    pub media_source_id: String,
    /// Absent when the engine resolves the stream by id itself
    pub locator: Option<String>,
    pub start_offset_ms: i64,
    pub season_index: Option<i32>,
    pub episode_index: Option<i32>,
    pub external_subtitles: Vec<ExternalSubtitle>,
}

impl fmt::Display for PlayableItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.season_index, self.episode_index) {
            (Some(s), Some(e)) => write!(f, "S{:02}E{:02} - {}", s, e, self.name)?,
            _ => write!(f, "{}", self.name)?,
        }
        if self.start_offset_ms > 0 {
            write!(f, " @ {}", format_millis(self.start_offset_ms))?;
        }
        Ok(())
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Format milliseconds as HH:MM:SS or MM:SS
fn format_millis(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
