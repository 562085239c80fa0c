use futures::stream::{self, Stream};
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::spotify::auth::AccessToken;
use crate::spotify::client::SpotifyClient;
use crate::spotify::models::TracksPage;

/// Caller-driven walk over a playlist's tracks, one request per page.
///
/// Nothing is fetched until [`next_page`](Self::next_page) is called, and only
/// the current offset is kept between calls. A failed fetch leaves the offset
/// untouched so the same page can be retried. Pages are not a consistent
/// snapshot: edits to the playlist mid-walk can duplicate or skip entries.
#[derive(Debug, Clone)]
pub struct TrackPager {
    client: SpotifyClient,
    playlist_id: String,
    token: AccessToken,
    offset: u32,
    exhausted: bool,
}

impl TrackPager {
    pub fn new(client: SpotifyClient, playlist_id: &str, token: AccessToken) -> Self {
        Self::starting_at(client, playlist_id, token, 0)
    }

    /// Resumes a walk from `offset`, e.g. one saved from [`offset`](Self::offset).
    pub fn starting_at(
        client: SpotifyClient,
        playlist_id: &str,
        token: AccessToken,
        offset: u32,
    ) -> Self {
        Self {
            client,
            playlist_id: playlist_id.to_string(),
            token,
            offset,
            exhausted: false,
        }
    }

    /// Offset the next page will be requested at.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetches the next non-empty page, or `None` once the playlist is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<TracksPage>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self
            .client
            .list_playlist_tracks(&self.playlist_id, &self.token, self.offset)
            .await?;

        if page.items.is_empty() {
            debug!("Playlist {} exhausted at offset {}", self.playlist_id, self.offset);
            self.exhausted = true;
            return Ok(None);
        }

        self.offset = page.next_offset(self.offset);
        self.exhausted = page.is_last();
        Ok(Some(page))
    }

    /// Adapts the pager into a stream of pages. The stream ends after the last
    /// page or after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<TracksPage>> {
        stream::try_unfold(self, |mut pager| async move {
            Ok::<_, ApiError>(pager.next_page().await?.map(|page| (page, pager)))
        })
    }
}
