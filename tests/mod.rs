//! Integration tests for jellyqueue
//!
//! Tests are organized by component:
//! - subtitles_test: External subtitle extraction
//! - queue_test: Queue building and result delivery (in-memory catalog)
//! - jellyfin_test: Jellyfin client against a mock server
//! - cli_test: Argument parsing, JSON output, command handlers

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
