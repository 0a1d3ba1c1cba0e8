//! External subtitle discovery
//!
//! Picks the side-loadable subtitle tracks out of a media source and turns
//! their server-relative delivery URLs into absolute ones the playback
//! engine can fetch directly.

use crate::models::{ExternalSubtitle, MediaSource, MediaStream, StreamKind, SubtitleFormat};

/// Title used when the server has none for a track
pub const DEFAULT_FALLBACK_TITLE: &str = "External";

/// Extracts external subtitle tracks from media sources
#[derive(Debug, Clone)]
pub struct SubtitleExtractor {
    base_url: String,
    fallback_title: String,
}

impl SubtitleExtractor {
    /// Create an extractor resolving delivery URLs against `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
        }
    }

    /// Use a localized label for untitled tracks
    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.fallback_title = title.into();
        self
    }

    /// External subtitles of `source`, in stream order
    pub fn extract(&self, source: &MediaSource) -> Vec<ExternalSubtitle> {
        source
            .streams
            .iter()
            .filter_map(|stream| self.to_external(stream))
            .collect()
    }

    fn to_external(&self, stream: &MediaStream) -> Option<ExternalSubtitle> {
        if !stream.is_external || stream.kind != StreamKind::Subtitle {
            return None;
        }
        let delivery_url = stream
            .delivery_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())?;

        let format = SubtitleFormat::from_codec(stream.codec.as_deref());
        let delivery_url = match format {
            SubtitleFormat::WebVtt => fix_webvtt_extension(delivery_url),
            _ => delivery_url.to_string(),
        };

        let title = stream
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(self.fallback_title.as_str())
            .to_string();

        Some(ExternalSubtitle {
            title,
            language: stream.language.clone().unwrap_or_default(),
            url: format!("{}{}", self.base_url, delivery_url),
            format,
        })
    }
}

/// Servers advertise webvtt tracks but hand out a `Stream.srt` delivery URL.
/// Rewrite the path to `Stream.vtt`, keeping any query string.
fn fix_webvtt_extension(delivery_url: &str) -> String {
    let (path, query) = match delivery_url.find('?') {
        Some(idx) => delivery_url.split_at(idx),
        None => (delivery_url, ""),
    };
    match path.strip_suffix("Stream.srt") {
        Some(prefix) => format!("{}Stream.vtt{}", prefix, query),
        None => delivery_url.to_string(),
    }
}
