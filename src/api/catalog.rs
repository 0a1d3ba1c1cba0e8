//! Catalog service contract
//!
//! Everything the playback pipeline needs from the remote library:
//! intros, next-up suggestions, seasons, episodes, media sources and the
//! user's playback preferences. Implementations own all transport concerns.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CatalogEntry, MediaSource, UserPlaybackPolicy};

/// Catalog error types
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Resource not found (404)")]
    NotFound,

    #[error("Not authorized, check the access token")]
    Unauthorized,

    #[error("Server error: {0}")]
    ServerError(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Optional item fields the catalog only returns on request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    MediaSources,
}

impl ItemField {
    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemField::MediaSources => "MediaSources",
        }
    }
}

/// Episode listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeQuery {
    pub show_id: String,
    pub season_id: Option<String>,
    pub fields: Vec<ItemField>,
    /// Start the listing at this episode (inclusive)
    pub start_item_id: Option<String>,
    /// None = no limit
    pub limit: Option<u32>,
}

impl EpisodeQuery {
    /// All episodes of a show
    pub fn new(show_id: impl Into<String>) -> Self {
        Self {
            show_id: show_id.into(),
            season_id: None,
            fields: Vec::new(),
            start_item_id: None,
            limit: None,
        }
    }

    pub fn season(mut self, season_id: Option<String>) -> Self {
        self.season_id = season_id;
        self
    }

    pub fn field(mut self, field: ItemField) -> Self {
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
        self
    }

    pub fn starting_at(mut self, item_id: impl Into<String>) -> Self {
        self.start_item_id = Some(item_id.into());
        self
    }

    pub fn limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }
}

/// Remote media catalog
///
/// All list results are returned in catalog order; callers rely on it.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Pre-roll clips for an entry
    async fn intros(&self, item_id: &str) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Suggested next episode for a show (0 or 1 entries expected)
    async fn next_up(&self, show_id: &str) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Seasons of a show
    async fn seasons(&self, show_id: &str) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Episodes matching the query
    async fn episodes(&self, query: &EpisodeQuery) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Playable renditions of an entry
    async fn media_sources(&self, item_id: &str) -> Result<Vec<MediaSource>, CatalogError>;

    /// Current user's playback preferences
    async fn playback_policy(&self) -> Result<UserPlaybackPolicy, CatalogError>;

    /// Base URL that relative delivery URLs are resolved against
    fn base_url(&self) -> &str;
}
