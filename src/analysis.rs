//! The duration-aggregation pipeline.
//!
//! resolve ID → playlist metadata → paginate membership → slice range →
//! batch-fetch durations → sum → rescale → format.
//!
//! Any failing request aborts the whole analysis; no partial totals are returned.

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Add;
use tracing::{info, warn};

use crate::constants::constants;
use crate::duration::{PlaybackSpeed, format_duration, try_parse_duration};
use crate::error::{AnalysisError, Result};
use crate::playlist;
use crate::range::{RangeRequest, ResolvedRange};
use crate::youtube::{VideoDuration, YouTubeApi, extract_playlist_id};

/// What to analyze and how.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
  pub url: String,
  pub range: RangeRequest,
  pub speed: PlaybackSpeed,
  /// How many `/videos` batches may be in flight at once. 1 = strictly sequential.
  pub batch_concurrency: usize,
}

impl AnalysisRequest {
  /// Validates the speed up front so bad input never costs an API call. The range
  /// can only be checked once the playlist size is known.
  pub fn new(url: impl Into<String>, start: usize, end: Option<usize>, speed: f64) -> Result<Self> {
    Ok(Self {
      url: url.into(),
      range: RangeRequest::new(start, end),
      speed: PlaybackSpeed::new(speed)?,
      batch_concurrency: constants().batch_concurrency,
    })
  }

  pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
    self.batch_concurrency = concurrency.max(1);
    self
  }
}

/// Watch time at one playback speed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedEstimate {
  pub speed: PlaybackSpeed,
  pub seconds: u64,
  pub duration: String,
}

impl SpeedEstimate {
  fn new(speed: PlaybackSpeed, total_seconds: u64) -> Self {
    let seconds = speed.adjust(total_seconds);
    Self { speed, seconds, duration: format_duration(seconds) }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
  pub playlist_id: String,
  pub playlist_title: String,
  pub channel_name: String,
  pub total_videos: usize,
  pub range: ResolvedRange,
  pub analyzed_range: String,
  pub video_count: usize,
  /// Selected videos with no usable duration (deleted, private, or unparseable).
  pub unavailable_videos: usize,
  pub speed: PlaybackSpeed,
  pub original_seconds: u64,
  pub adjusted_seconds: u64,
  pub original_duration: String,
  pub adjusted_duration: String,
  pub time_saved: String,
  pub speed_comparison: Vec<SpeedEstimate>,
}

/// Running total over `/videos` batches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct DurationTally {
  seconds: u64,
  unavailable: usize,
}

impl Add for DurationTally {
  type Output = Self;

  fn add(self, other: Self) -> Self {
    Self { seconds: self.seconds.saturating_add(other.seconds), unavailable: self.unavailable + other.unavailable }
  }
}

impl DurationTally {
  /// Each requested ID is looked up in the response by `video_id`, so a video listed
  /// twice in a playlist is summed twice even though the API answers it once.
  fn from_batch(batch: &[String], videos: &[VideoDuration]) -> Self {
    let by_id: HashMap<&str, Option<&str>> =
      videos.iter().map(|v| (v.video_id.as_str(), v.duration.as_deref())).collect();
    let mut tally = Self::default();
    for id in batch {
      match by_id.get(id.as_str()) {
        Some(&raw) => match raw.and_then(try_parse_duration) {
          Some(secs) => tally.seconds = tally.seconds.saturating_add(secs),
          None => {
            warn!(video_id = %id, raw = ?raw, "analysis: unusable duration, counting as 0");
            tally.unavailable += 1;
          }
        },
        None => {
          warn!(video_id = %id, "analysis: video missing from response, counting as 0");
          tally.unavailable += 1;
        }
      }
    }
    tally
  }
}

/// Fetch and sum durations in batches of at most `batch_size` IDs.
async fn total_duration<A: YouTubeApi>(
  api: &A,
  video_ids: &[String],
  batch_size: usize,
  concurrency: usize,
) -> Result<DurationTally> {
  stream::iter(video_ids.chunks(batch_size.max(1)))
    .map(move |batch| async move {
      let videos = api.video_durations(batch).await?;
      Ok::<_, AnalysisError>(DurationTally::from_batch(batch, &videos))
    })
    .buffer_unordered(concurrency.max(1))
    .try_fold(DurationTally::default(), |acc, tally| async move { Ok(acc + tally) })
    .await
}

/// Estimate how long the requested part of a playlist takes to watch.
pub async fn analyze_playlist<A: YouTubeApi>(api: &A, request: &AnalysisRequest) -> Result<AnalysisResult> {
  let playlist_id = extract_playlist_id(&request.url)?;

  info!(playlist_id = %playlist_id, "analysis: fetching playlist details");
  let details =
    api.playlist_details(&playlist_id).await?.ok_or_else(|| AnalysisError::NotFound(playlist_id.clone()))?;

  let all_ids: Vec<String> = playlist::video_ids(api, &playlist_id).try_collect().await?;
  let range = request.range.resolve(all_ids.len())?;
  let selected = range.select(&all_ids);
  info!(total = all_ids.len(), range = %range.label(), selected = selected.len(), "analysis: playlist membership loaded");

  let tally = total_duration(api, selected, constants().video_batch_size, request.batch_concurrency).await?;
  let adjusted = request.speed.adjust(tally.seconds);
  info!(
    original_secs = tally.seconds,
    adjusted_secs = adjusted,
    unavailable = tally.unavailable,
    speed = request.speed.value(),
    "analysis: complete"
  );

  let speed_comparison = constants()
    .comparison_speeds
    .iter()
    .filter_map(|&s| PlaybackSpeed::new(s).ok())
    .map(|s| SpeedEstimate::new(s, tally.seconds))
    .collect();

  Ok(AnalysisResult {
    playlist_id,
    playlist_title: details.title,
    channel_name: details.channel_title,
    total_videos: all_ids.len(),
    range,
    analyzed_range: range.label(),
    video_count: selected.len(),
    unavailable_videos: tally.unavailable,
    speed: request.speed,
    original_seconds: tally.seconds,
    adjusted_seconds: adjusted,
    original_duration: format_duration(tally.seconds),
    adjusted_duration: format_duration(adjusted),
    time_saved: format_duration(tally.seconds.saturating_sub(adjusted)),
    speed_comparison,
  })
}
