//! Catalog service access
//!
//! - Catalog: the contract the playback pipeline consumes
//! - Jellyfin: HTTP client implementing it

pub mod catalog;
pub mod jellyfin;

pub use catalog::{Catalog, CatalogError, EpisodeQuery, ItemField};
pub use jellyfin::{JellyfinClient, ServerSettings};
