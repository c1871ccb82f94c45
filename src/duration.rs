use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{AnalysisError, Result};

/// YouTube `contentDetails.duration`: `PT#H#M#S`, with a `#D` day part for 24h+ videos
/// and `P0D` for live streams.
static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").expect("duration pattern is a valid regex")
});

/// Parse an ISO-8601 video duration into whole seconds.
/// Returns `None` when the value doesn't look like a duration at all.
pub fn try_parse_duration(raw: &str) -> Option<u64> {
  let caps = ISO_DURATION.captures(raw.trim())?;
  let part = |idx: usize| -> Option<u64> {
    match caps.get(idx) {
      Some(m) => m.as_str().parse().ok(),
      None => Some(0),
    }
  };
  let (days, hours, minutes, seconds) = (part(1)?, part(2)?, part(3)?, part(4)?);
  Some(
    days
      .saturating_mul(86_400)
      .saturating_add(hours.saturating_mul(3600))
      .saturating_add(minutes.saturating_mul(60))
      .saturating_add(seconds),
  )
}

/// Format seconds as `"{h}h {m}m"` or `"{m}m"`. Leftover seconds are dropped, not rounded.
pub fn format_duration(total_seconds: u64) -> String {
  let hours = total_seconds / 3600;
  let minutes = (total_seconds % 3600) / 60;
  if hours > 0 { format!("{}h {}m", hours, minutes) } else { format!("{}m", minutes) }
}

/// A playback speed multiplier. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlaybackSpeed(f64);

impl PlaybackSpeed {
  pub const NORMAL: PlaybackSpeed = PlaybackSpeed(1.0);

  pub fn new(value: f64) -> Result<Self> {
    if value.is_finite() && value > 0.0 { Ok(Self(value)) } else { Err(AnalysisError::InvalidSpeed(value)) }
  }

  pub fn value(self) -> f64 {
    self.0
  }

  /// Seconds needed to watch `total_seconds` of footage at this speed, rounded half away from zero.
  pub fn adjust(self, total_seconds: u64) -> u64 {
    (total_seconds as f64 / self.0).round() as u64
  }
}

impl Default for PlaybackSpeed {
  fn default() -> Self {
    Self::NORMAL
  }
}

impl fmt::Display for PlaybackSpeed {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}x", self.0)
  }
}
