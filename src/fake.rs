//! In-memory stand-in for the YouTube Data API, used by the pipeline tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::constants::constants;
use crate::error::{AnalysisError, FetchStage, Result};
use crate::youtube::{MembershipPage, PlaylistDetails, VideoDuration, YouTubeApi};

pub struct FakeYouTube {
  details: Option<PlaylistDetails>,
  videos: Vec<(String, String)>,
  omitted: HashSet<String>,
  fail_items_page: Option<usize>,
  fail_video_batch: Option<usize>,
  item_requests: AtomicUsize,
  video_requests: AtomicUsize,
  batch_sizes: Mutex<Vec<usize>>,
}

impl FakeYouTube {
  /// A public playlist whose videos are `vid1..vidN` with the given lengths in seconds.
  pub fn with_videos(seconds: &[u64]) -> Self {
    let raw: Vec<String> = seconds.iter().map(|s| format!("PT{}S", s)).collect();
    Self::with_raw_durations(&raw.iter().map(String::as_str).collect::<Vec<_>>())
  }

  pub fn with_raw_durations(durations: &[&str]) -> Self {
    let ids: Vec<String> = (1..=durations.len()).map(|i| format!("vid{}", i)).collect();
    let entries: Vec<(&str, &str)> = ids.iter().map(String::as_str).zip(durations.iter().copied()).collect();
    Self::with_entries(&entries)
  }

  /// Playlist entries in order as `(video_id, raw duration)`. An ID may appear more than once.
  pub fn with_entries(entries: &[(&str, &str)]) -> Self {
    Self {
      details: Some(PlaylistDetails { title: "Rust in Depth".to_string(), channel_title: "Ferris".to_string() }),
      videos: entries.iter().map(|(id, d)| (id.to_string(), d.to_string())).collect(),
      omitted: HashSet::new(),
      fail_items_page: None,
      fail_video_batch: None,
      item_requests: AtomicUsize::new(0),
      video_requests: AtomicUsize::new(0),
      batch_sizes: Mutex::new(Vec::new()),
    }
  }

  pub fn without_playlist(mut self) -> Self {
    self.details = None;
    self
  }

  /// Leave a video out of `/videos` responses, like a deleted or private upload.
  pub fn omit_video(mut self, video_id: &str) -> Self {
    self.omitted.insert(video_id.to_string());
    self
  }

  /// Zero-based index of the membership page request that should fail.
  pub fn fail_items_page(mut self, page: usize) -> Self {
    self.fail_items_page = Some(page);
    self
  }

  /// Zero-based index of the `/videos` batch request that should fail.
  pub fn fail_video_batch(mut self, batch: usize) -> Self {
    self.fail_video_batch = Some(batch);
    self
  }

  pub fn item_requests(&self) -> usize {
    self.item_requests.load(Ordering::SeqCst)
  }

  pub fn video_requests(&self) -> usize {
    self.video_requests.load(Ordering::SeqCst)
  }

  pub fn batch_sizes(&self) -> Vec<usize> {
    self.batch_sizes.lock().unwrap().clone()
  }
}

impl YouTubeApi for FakeYouTube {
  async fn playlist_details(&self, _playlist_id: &str) -> Result<Option<PlaylistDetails>> {
    Ok(self.details.clone())
  }

  async fn playlist_items_page(&self, _playlist_id: &str, page_token: Option<&str>) -> Result<MembershipPage> {
    let request = self.item_requests.fetch_add(1, Ordering::SeqCst);
    if self.fail_items_page == Some(request) {
      return Err(AnalysisError::fetch(FetchStage::PlaylistItems, "HTTP 500"));
    }

    let page: usize = page_token.and_then(|t| t.strip_prefix("page-")).and_then(|n| n.parse().ok()).unwrap_or(0);
    let size = constants().playlist_page_size;
    let start = (page * size).min(self.videos.len());
    let end = (start + size).min(self.videos.len());
    Ok(MembershipPage {
      video_ids: self.videos[start..end].iter().map(|(id, _)| id.clone()).collect(),
      next_page_token: (end < self.videos.len()).then(|| format!("page-{}", page + 1)),
    })
  }

  async fn video_durations(&self, video_ids: &[String]) -> Result<Vec<VideoDuration>> {
    let request = self.video_requests.fetch_add(1, Ordering::SeqCst);
    self.batch_sizes.lock().unwrap().push(video_ids.len());
    if self.fail_video_batch == Some(request) {
      return Err(AnalysisError::fetch(FetchStage::VideoDetails, "HTTP 403: quota exceeded"));
    }

    // Like the real endpoint, a repeated ID is answered once.
    let mut seen = HashSet::new();
    Ok(
      video_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter(|id| !self.omitted.contains(*id))
        .filter_map(|id| self.videos.iter().find(|(vid, _)| vid == id))
        .map(|(id, raw)| VideoDuration { video_id: id.clone(), duration: Some(raw.clone()) })
        .collect(),
    )
  }
}
