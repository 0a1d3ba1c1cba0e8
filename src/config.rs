//! Configuration management for jellyqueue
//!
//! Handles config file loading/saving and server credential lookup.
//! Config is stored at ~/.config/jellyqueue/config.toml

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::ServerSettings;
use crate::playback::QueueOptions;

const ENV_SERVER_URL: &str = "JELLYFIN_URL";
const ENV_ACCESS_TOKEN: &str = "JELLYFIN_TOKEN";
const ENV_USER_ID: &str = "JELLYFIN_USER_ID";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Jellyfin server base URL (e.g. http://192.168.1.10:8096)
    pub server_url: Option<String>,
    /// API key or session access token
    pub access_token: Option<String>,
    /// User whose library and preferences are used
    pub user_id: Option<String>,
    /// Device name reported to the server
    pub device_name: Option<String>,
    /// Stable device id reported to the server
    pub device_id: Option<String>,
    /// Queue episodes that haven't aired yet (default: true)
    pub include_virtual_episodes: Option<bool>,
    /// Label for external subtitles without a title
    pub subtitle_fallback_title: Option<String>,
    /// Catalog requests a queue build keeps in flight per expansion step
    pub max_concurrent_requests: Option<usize>,

    /// File this config was loaded from
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl Config {
    /// Get config file path (~/.config/jellyqueue/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jellyqueue").join("config.toml"))
    }

    /// Load config from the default location, or return default if not found
    pub fn load() -> Self {
        Self::path().map(|p| Self::load_from(&p)).unwrap_or_default()
    }

    /// Load config from a specific file, or return default if unreadable
    ///
    /// Later saves go back to `path`.
    pub fn load_from(path: &Path) -> Self {
        let mut config: Self = std::fs::read_to_string(path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default();
        config.source = Some(path.to_path_buf());
        config
    }

    /// File this config was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Save config back to the file it was loaded from, or the default location
    pub fn save(&self) -> Result<()> {
        let path = match &self.source {
            Some(path) => path.clone(),
            None => Self::path().ok_or_else(|| anyhow!("Could not determine config path"))?,
        };
        self.save_to(&path)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Get the device id, generating (and caching) one on first use
    pub fn get_device_id(&mut self) -> String {
        if let Some(ref id) = self.device_id {
            return id.clone();
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        self.device_id = Some(id.clone());
        let _ = self.save(); // Best effort save
        id
    }

    /// Resolve server connection settings with fallback chain:
    /// 1. Environment variables JELLYFIN_URL / JELLYFIN_TOKEN / JELLYFIN_USER_ID
    /// 2. Values from the config file
    pub fn server_settings(&mut self) -> Result<ServerSettings> {
        let base_url = env_or(ENV_SERVER_URL, &self.server_url)
            .ok_or_else(|| anyhow!("No server URL (set {} or server_url)", ENV_SERVER_URL))?;
        let access_token = env_or(ENV_ACCESS_TOKEN, &self.access_token)
            .ok_or_else(|| anyhow!("No access token (set {} or access_token)", ENV_ACCESS_TOKEN))?;
        let user_id = env_or(ENV_USER_ID, &self.user_id)
            .ok_or_else(|| anyhow!("No user id (set {} or user_id)", ENV_USER_ID))?;

        Ok(ServerSettings {
            base_url,
            access_token,
            user_id,
            device_name: self
                .device_name
                .clone()
                .unwrap_or_else(|| "jellyqueue".to_string()),
            device_id: self.get_device_id(),
        })
    }

    /// Queue policy derived from the config
    pub fn queue_options(&self) -> QueueOptions {
        let defaults = QueueOptions::default();
        QueueOptions {
            include_virtual_episodes: self
                .include_virtual_episodes
                .unwrap_or(defaults.include_virtual_episodes),
            subtitle_fallback_title: self
                .subtitle_fallback_title
                .clone()
                .unwrap_or(defaults.subtitle_fallback_title),
            max_concurrent_requests: self
                .max_concurrent_requests
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrent_requests),
        }
    }
}

fn env_or(var: &str, fallback: &Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.clone())
}
