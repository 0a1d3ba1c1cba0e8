//! Playback queue pipeline
//!
//! - Subtitles: external subtitle discovery for a media source
//! - Item: one catalog entry -> one playable item
//! - Queue: catalog entry -> ordered playback queue
//! - Controller: build requests and latest-result delivery

pub mod controller;
pub mod item;
pub mod queue;
pub mod subtitles;

pub use controller::{QueueController, QueueSubscription};
pub use item::PlayableItemBuilder;
pub use queue::{QueueBuilder, QueueError, QueueOptions, QueueResult};
pub use subtitles::SubtitleExtractor;
