//! Jellyfin API client
//!
//! Implements the [`Catalog`] contract over Jellyfin's HTTP API.
//! API docs: https://api.jellyfin.org

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::catalog::{Catalog, CatalogError, EpisodeQuery};
use crate::models::{
    CatalogEntry, EntryKind, EntryOrigin, MediaSource, MediaStream, Protocol, StreamKind,
    UserPlaybackPolicy,
};

const CLIENT_NAME: &str = "jellyqueue";

/// Connection settings for a Jellyfin server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub base_url: String,
    pub access_token: String,
    pub user_id: String,
    pub device_name: String,
    pub device_id: String,
}

/// Jellyfin API client
pub struct JellyfinClient {
    settings: ServerSettings,
    client: reqwest::Client,
}

impl JellyfinClient {
    /// Create a new client for the given server
    pub fn new(mut settings: ServerSettings) -> Self {
        settings.base_url = settings.base_url.trim_end_matches('/').to_string();
        Self {
            settings,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self::new(ServerSettings {
            base_url: base_url.into(),
            access_token: access_token.into(),
            user_id: user_id.into(),
            device_name: CLIENT_NAME.to_string(),
            device_id: "test-device".to_string(),
        })
    }

    fn authorization(&self) -> String {
        format!(
            "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\", Token=\"{}\"",
            CLIENT_NAME,
            self.settings.device_name,
            self.settings.device_id,
            env!("CARGO_PKG_VERSION"),
            self.settings.access_token
        )
    }

    /// Make an authenticated GET request and decode the JSON body
    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.settings.base_url, endpoint);
        debug!(%url, "catalog request");

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.authorization())
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                serde_json::from_str(&body)
                    .map_err(|e| CatalogError::InvalidResponse(format!("JSON parse error: {}", e)))
            }
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CatalogError::Unauthorized),
            status => Err(CatalogError::ServerError(status.as_u16())),
        }
    }

    /// Get a single item as seen by the configured user
    pub async fn item(&self, item_id: &str) -> Result<CatalogEntry, CatalogError> {
        let endpoint = format!(
            "/Users/{}/Items/{}",
            urlencoding::encode(&self.settings.user_id),
            urlencoding::encode(item_id)
        );
        let raw: BaseItemRaw = self.get(&endpoint).await?;
        let item_type = raw.item_type.clone();
        raw.into_entry().ok_or_else(|| {
            CatalogError::InvalidResponse(format!("Unsupported item type: {}", item_type))
        })
    }

    async fn get_items(&self, endpoint: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let response: ItemsResponse = self.get(endpoint).await?;
        Ok(response.into_entries())
    }
}

#[async_trait]
impl Catalog for JellyfinClient {
    async fn intros(&self, item_id: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let endpoint = format!(
            "/Users/{}/Items/{}/Intros",
            urlencoding::encode(&self.settings.user_id),
            urlencoding::encode(item_id)
        );
        self.get_items(&endpoint).await
    }

    async fn next_up(&self, show_id: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let endpoint = format!(
            "/Shows/NextUp?UserId={}&SeriesId={}&Fields=MediaSources",
            urlencoding::encode(&self.settings.user_id),
            urlencoding::encode(show_id)
        );
        self.get_items(&endpoint).await
    }

    async fn seasons(&self, show_id: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let endpoint = format!(
            "/Shows/{}/Seasons?UserId={}",
            urlencoding::encode(show_id),
            urlencoding::encode(&self.settings.user_id)
        );
        self.get_items(&endpoint).await
    }

    async fn episodes(&self, query: &EpisodeQuery) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut endpoint = format!(
            "/Shows/{}/Episodes?UserId={}",
            urlencoding::encode(&query.show_id),
            urlencoding::encode(&self.settings.user_id)
        );
        if let Some(season_id) = &query.season_id {
            endpoint.push_str(&format!("&SeasonId={}", urlencoding::encode(season_id)));
        }
        if !query.fields.is_empty() {
            let fields: Vec<&str> = query.fields.iter().map(|f| f.as_str()).collect();
            endpoint.push_str(&format!("&Fields={}", fields.join(",")));
        }
        if let Some(start) = &query.start_item_id {
            endpoint.push_str(&format!("&StartItemId={}", urlencoding::encode(start)));
        }
        if let Some(limit) = query.limit {
            endpoint.push_str(&format!("&Limit={}", limit));
        }
        self.get_items(&endpoint).await
    }

    async fn media_sources(&self, item_id: &str) -> Result<Vec<MediaSource>, CatalogError> {
        let endpoint = format!(
            "/Items/{}/PlaybackInfo?UserId={}",
            urlencoding::encode(item_id),
            urlencoding::encode(&self.settings.user_id)
        );
        let response: PlaybackInfoResponse = self.get(&endpoint).await?;
        Ok(response
            .media_sources
            .into_iter()
            .map(|s| s.into_source())
            .collect())
    }

    async fn playback_policy(&self) -> Result<UserPlaybackPolicy, CatalogError> {
        let endpoint = format!("/Users/{}", urlencoding::encode(&self.settings.user_id));
        let user: UserRaw = self.get(&endpoint).await?;
        Ok(user.into_policy())
    }

    fn base_url(&self) -> &str {
        &self.settings.base_url
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemsResponse {
    #[serde(default)]
    items: Vec<BaseItemRaw>,
}

impl ItemsResponse {
    fn into_entries(self) -> Vec<CatalogEntry> {
        self.items
            .into_iter()
            .filter_map(|i| i.into_entry())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BaseItemRaw {
    id: String,
    name: Option<String>,
    #[serde(rename = "Type")]
    item_type: String,
    series_id: Option<String>,
    season_id: Option<String>,
    parent_id: Option<String>,
    index_number: Option<i32>,
    parent_index_number: Option<i32>,
    media_sources: Option<Vec<MediaSourceRaw>>,
    user_data: Option<UserDataRaw>,
    location_type: Option<String>,
}

impl BaseItemRaw {
    fn into_entry(self) -> Option<CatalogEntry> {
        let kind = match self.item_type.as_str() {
            // Intros usually arrive as trailers or plain videos
            "Movie" | "Video" | "Trailer" | "MusicVideo" => EntryKind::Movie,
            "Series" => EntryKind::Show,
            "Season" => EntryKind::Season {
                show_id: self.series_id.clone().or(self.parent_id.clone())?,
                season_index: self.index_number,
            },
            "Episode" => EntryKind::Episode {
                show_id: self.series_id.clone()?,
                season_id: self.season_id.clone(),
                season_index: self.parent_index_number,
                episode_index: self.index_number,
            },
            _ => return None, // Folders, box sets, people...
        };

        let is_virtual = self
            .location_type
            .as_deref()
            .is_some_and(|l| l.eq_ignore_ascii_case("virtual"));

        Some(CatalogEntry {
            name: self.name.unwrap_or_default(),
            id: self.id,
            kind,
            media_sources: self
                .media_sources
                .unwrap_or_default()
                .into_iter()
                .map(|s| s.into_source())
                .collect(),
            playback_position_ticks: self
                .user_data
                .and_then(|u| u.playback_position_ticks)
                .unwrap_or(0),
            origin: EntryOrigin::Remote,
            is_virtual,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserDataRaw {
    playback_position_ticks: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlaybackInfoResponse {
    #[serde(default)]
    media_sources: Vec<MediaSourceRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MediaSourceRaw {
    id: String,
    path: Option<String>,
    protocol: Option<Protocol>,
    media_streams: Option<Vec<MediaStreamRaw>>,
}

impl MediaSourceRaw {
    fn into_source(self) -> MediaSource {
        MediaSource {
            id: self.id,
            path: self.path,
            protocol: self.protocol.unwrap_or(Protocol::Unknown),
            streams: self
                .media_streams
                .unwrap_or_default()
                .into_iter()
                .map(|s| s.into_stream())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MediaStreamRaw {
    #[serde(rename = "Type")]
    kind: StreamKind,
    is_external: Option<bool>,
    delivery_url: Option<String>,
    codec: Option<String>,
    language: Option<String>,
    title: Option<String>,
}

impl MediaStreamRaw {
    fn into_stream(self) -> MediaStream {
        MediaStream {
            kind: self.kind,
            is_external: self.is_external.unwrap_or(false),
            delivery_url: self.delivery_url,
            codec: self.codec,
            language: self.language,
            title: self.title,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserRaw {
    configuration: Option<UserConfigurationRaw>,
}

impl UserRaw {
    fn into_policy(self) -> UserPlaybackPolicy {
        // Jellyfin defaults this preference to on
        let auto_advance = self
            .configuration
            .and_then(|c| c.enable_next_episode_auto_play)
            .unwrap_or(true);
        UserPlaybackPolicy { auto_advance }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserConfigurationRaw {
    enable_next_episode_auto_play: Option<bool>,
}
