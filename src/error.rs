use thiserror::Error;

/// Which network call failed, for error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
  PlaylistDetails,
  PlaylistItems,
  VideoDetails,
}

impl FetchStage {
  pub fn label(self) -> &'static str {
    match self {
      FetchStage::PlaylistDetails => "playlist details",
      FetchStage::PlaylistItems => "playlist items",
      FetchStage::VideoDetails => "video details",
    }
  }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
  #[error("YouTube API key is required. Pass --api-key, set YOUTUBE_API_KEY, or run `playtime set-key`")]
  MissingCredential,

  #[error("Invalid YouTube playlist URL: {0}")]
  InvalidPlaylistUrl(String),

  #[error("Playlist not found or is private: {0}")]
  NotFound(String),

  #[error("Failed to fetch {}: {detail}", .stage.label())]
  FetchError { stage: FetchStage, detail: String },

  #[error("Playback speed must be a positive number, got {0}")]
  InvalidSpeed(f64),

  #[error("End video #{end} comes before start video #{start}")]
  InvalidRange { start: usize, end: usize },
}

impl AnalysisError {
  pub fn fetch(stage: FetchStage, detail: impl Into<String>) -> Self {
    AnalysisError::FetchError { stage, detail: detail.into() }
  }
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
