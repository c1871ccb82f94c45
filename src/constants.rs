//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub api_base_url: String,

  // YouTube Data API limits
  pub playlist_page_size: usize,
  pub video_batch_size: usize,

  // Playback speed
  pub min_speed: f64,
  pub max_speed: f64,
  pub comparison_speeds: Vec<f64>,

  // Networking
  pub request_timeout_secs: u64,
  pub batch_concurrency: usize,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed the first test run catches it.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
