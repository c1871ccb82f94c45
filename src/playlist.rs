use futures::stream::{self, Stream, TryStreamExt};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::youtube::YouTubeApi;

/// Every video ID in a playlist, in playlist order.
///
/// Pages are requested one at a time as the stream is polled, following
/// `nextPageToken` until the API stops returning one. The stream ends after
/// the first error.
pub fn video_ids<'a, A: YouTubeApi>(api: &'a A, playlist_id: &'a str) -> impl Stream<Item = Result<String>> + 'a {
  // `None` = done, `Some(None)` = first page, `Some(Some(token))` = a later page.
  stream::try_unfold(Some(None::<String>), move |cursor| async move {
    let Some(token) = cursor else {
      return Ok::<_, AnalysisError>(None);
    };
    let page = api.playlist_items_page(playlist_id, token.as_deref()).await?;
    let next = page.next_page_token.filter(|t| !t.is_empty());
    debug!(playlist_id, items = page.video_ids.len(), has_more = next.is_some(), "playlist: fetched page");
    Ok(Some((page.video_ids, next.map(Some))))
  })
  .map_ok(|ids| stream::iter(ids.into_iter().map(Ok::<_, AnalysisError>)))
  .try_flatten()
}
