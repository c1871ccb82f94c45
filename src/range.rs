use serde::Serialize;

use crate::error::{AnalysisError, Result};

/// A user-requested, 1-based inclusive video range, before the playlist size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
  start: usize,
  end: Option<usize>,
}

impl RangeRequest {
  /// A start of 0 means 1 and an end of 0 means "to the last video".
  pub fn new(start: usize, end: Option<usize>) -> Self {
    Self { start: start.max(1), end: end.filter(|&e| e > 0) }
  }

  /// Clamp against the real playlist size.
  ///
  /// A start past the end of the playlist snaps to the last video, so the
  /// selection is never empty unless the playlist itself is. Bounds are
  /// compared after clamping: start 8, end 6 on a 5-video playlist is `5 - 5`.
  pub fn resolve(self, total: usize) -> Result<ResolvedRange> {
    if total == 0 {
      return Ok(ResolvedRange { start: 0, end: 0 });
    }
    let start = self.start.min(total);
    let end = self.end.map_or(total, |e| e.min(total));
    if end < start {
      return Err(AnalysisError::InvalidRange { start, end });
    }
    Ok(ResolvedRange { start, end })
  }
}

impl Default for RangeRequest {
  fn default() -> Self {
    Self { start: 1, end: None }
  }
}

/// The range actually analyzed. `start..=end`, 1-based; `0 - 0` for an empty playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRange {
  pub start: usize,
  pub end: usize,
}

impl ResolvedRange {
  pub fn len(&self) -> usize {
    if self.start == 0 { 0 } else { self.end + 1 - self.start }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn label(&self) -> String {
    format!("{} - {}", self.start, self.end)
  }

  pub fn select<'a, T>(&self, items: &'a [T]) -> &'a [T] {
    if self.is_empty() { &[] } else { &items[self.start - 1..self.end] }
  }
}
