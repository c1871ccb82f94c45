use regex::Regex;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

use crate::constants::constants;
use crate::error::{AnalysisError, FetchStage, Result};

static PLAYLIST_PARAM: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[&?]list=([^&#]+)").expect("playlist pattern is a valid regex"));

/// Pull the playlist ID out of the `list=` query parameter of a YouTube URL.
/// Works for `/playlist?list=...` as well as `/watch?v=...&list=...` links.
pub fn extract_playlist_id(url: &str) -> Result<String> {
  PLAYLIST_PARAM
    .captures(url.trim())
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str().to_string())
    .ok_or_else(|| AnalysisError::InvalidPlaylistUrl(url.to_string()))
}

/// YouTube Data API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
  pub fn new(key: Option<String>) -> Result<Self> {
    match key.map(|k| k.trim().to_string()) {
      Some(k) if !k.is_empty() => Ok(Self(k)),
      _ => Err(AnalysisError::MissingCredential),
    }
  }

  fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for ApiKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("ApiKey(***)")
  }
}

// --- Domain types ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDetails {
  pub title: String,
  pub channel_title: String,
}

/// One page of playlist membership.
#[derive(Debug, Clone, Default)]
pub struct MembershipPage {
  pub video_ids: Vec<String>,
  pub next_page_token: Option<String>,
}

/// Raw `contentDetails.duration` for one video, if the API reported one.
#[derive(Debug, Clone)]
pub struct VideoDuration {
  pub video_id: String,
  pub duration: Option<String>,
}

/// The three YouTube Data API calls the analysis pipeline needs.
pub trait YouTubeApi {
  /// `Ok(None)` when the playlist doesn't exist or isn't public.
  async fn playlist_details(&self, playlist_id: &str) -> Result<Option<PlaylistDetails>>;

  async fn playlist_items_page(&self, playlist_id: &str, page_token: Option<&str>) -> Result<MembershipPage>;

  /// Videos the API no longer knows about are simply absent from the response.
  async fn video_durations(&self, video_ids: &[String]) -> Result<Vec<VideoDuration>>;
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
  #[serde(default = "Vec::new")]
  items: Vec<T>,
  next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistResource {
  snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
  title: String,
  #[serde(default)]
  channel_title: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemResource {
  snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
  resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
  video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
  id: String,
  content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
  duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
  error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
  message: String,
}

/// Turn a non-success response body into a short message, preferring the API's own `error.message`.
fn describe_failure(status: StatusCode, body: &str) -> String {
  match serde_json::from_str::<ApiErrorBody>(body) {
    Ok(parsed) if !parsed.error.message.is_empty() => format!("HTTP {}: {}", status.as_u16(), parsed.error.message),
    _ => format!("HTTP {}", status.as_u16()),
  }
}

// --- HTTP client ---

/// YouTube Data API v3 client. The key is owned by the client, not global state.
pub struct YouTubeClient {
  http: Client,
  base_url: String,
  api_key: ApiKey,
  page_size: usize,
}

impl YouTubeClient {
  pub fn new(api_key: ApiKey, timeout: Duration) -> reqwest::Result<Self> {
    let http = Client::builder().user_agent(concat!("playtime/", env!("CARGO_PKG_VERSION"))).timeout(timeout).build()?;
    let c = constants();
    Ok(Self { http, base_url: c.api_base_url.clone(), api_key, page_size: c.playlist_page_size })
  }

  /// `{base}/{endpoint}?{params}&key={key}`
  fn request_url(&self, stage: FetchStage, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
    let endpoint_url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
    Url::parse_with_params(&endpoint_url, params.iter().copied().chain([("key", self.api_key.expose())]))
      .map_err(|e| AnalysisError::fetch(stage, format!("bad request URL: {}", e)))
  }

  fn playlists_url(&self, playlist_id: &str) -> Result<Url> {
    self.request_url(FetchStage::PlaylistDetails, "playlists", &[("part", "snippet"), ("id", playlist_id)])
  }

  /// The first page is requested without a `pageToken`.
  fn playlist_items_url(&self, playlist_id: &str, page_token: Option<&str>) -> Result<Url> {
    let max_results = self.page_size.to_string();
    let mut params = vec![("part", "snippet"), ("playlistId", playlist_id), ("maxResults", max_results.as_str())];
    if let Some(token) = page_token {
      params.push(("pageToken", token));
    }
    self.request_url(FetchStage::PlaylistItems, "playlistItems", &params)
  }

  fn videos_url(&self, video_ids: &[String]) -> Result<Url> {
    let ids = video_ids.join(",");
    self.request_url(FetchStage::VideoDetails, "videos", &[("part", "contentDetails"), ("id", ids.as_str())])
  }

  async fn get_json<T: DeserializeOwned>(&self, stage: FetchStage, url: Url) -> Result<T> {
    debug!(endpoint = url.path(), stage = stage.label(), "youtube: GET");
    let response = self.http.get(url).send().await.map_err(|e| AnalysisError::fetch(stage, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(AnalysisError::fetch(stage, describe_failure(status, &body)));
    }

    response.json::<T>().await.map_err(|e| AnalysisError::fetch(stage, format!("unexpected response: {}", e)))
  }
}

impl YouTubeApi for YouTubeClient {
  async fn playlist_details(&self, playlist_id: &str) -> Result<Option<PlaylistDetails>> {
    let url = self.playlists_url(playlist_id)?;
    let response: ListResponse<PlaylistResource> = self.get_json(FetchStage::PlaylistDetails, url).await?;
    Ok(
      response
        .items
        .into_iter()
        .next()
        .map(|p| PlaylistDetails { title: p.snippet.title, channel_title: p.snippet.channel_title }),
    )
  }

  async fn playlist_items_page(&self, playlist_id: &str, page_token: Option<&str>) -> Result<MembershipPage> {
    let url = self.playlist_items_url(playlist_id, page_token)?;
    let response: ListResponse<PlaylistItemResource> = self.get_json(FetchStage::PlaylistItems, url).await?;
    Ok(MembershipPage {
      video_ids: response.items.into_iter().map(|item| item.snippet.resource_id.video_id).collect(),
      next_page_token: response.next_page_token,
    })
  }

  async fn video_durations(&self, video_ids: &[String]) -> Result<Vec<VideoDuration>> {
    let url = self.videos_url(video_ids)?;
    let response: ListResponse<VideoResource> = self.get_json(FetchStage::VideoDetails, url).await?;
    Ok(
      response
        .items
        .into_iter()
        .map(|v| VideoDuration { video_id: v.id, duration: v.content_details.and_then(|cd| cd.duration) })
        .collect(),
    )
  }
}
