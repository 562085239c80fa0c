use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{Config, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL};
use crate::error::{ApiError, Result};
use crate::spotify::auth::AccessToken;
use crate::spotify::models::{
    join_uris, AudioAnalysis, AudioFeatures, PlaylistsPage, RemoveTracksRequest, Snapshot,
    TrackRemoval, TrackUri, TracksPage,
};
use crate::spotify::pager::TrackPager;

/// Value-type client for the Spotify Web API.
///
/// Holds only endpoint locations and the HTTP transport. Every call takes the
/// token explicitly, so clones can be shared freely across tasks.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http_client: Client,
    accounts_url: String,
    api_url: String,
}

impl Default for SpotifyClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SpotifyClient {
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Points the client at other hosts, e.g. a mock server.
    /// `api_url` includes the version prefix (`https://api.spotify.com/v1`).
    pub fn with_endpoints(accounts_url: &str, api_url: &str) -> Result<Self> {
        Ok(Self {
            http_client: Client::new(),
            accounts_url: normalize_base(accounts_url)?,
            api_url: normalize_base(api_url)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::with_endpoints(&config.spotify_accounts_url, &config.spotify_api_url)
    }

    /// Replaces the transport. Timeouts and proxies are configured there.
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub(crate) fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub(crate) fn accounts_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.accounts_url, path)
    }

    fn api_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorized(&self, request: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        request
            .bearer_auth(token.secret())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Spotify API request failed ({}): {}", status, body);
            return Err(ApiError::Provider { status, body });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &AccessToken) -> Result<T> {
        debug!("GET {}", path);
        let request = self.authorized(self.http_client.get(self.api_endpoint(path)), token);
        self.send_json(request).await
    }

    /// One page of the playlists owned or followed by `user_id`, exactly as returned.
    pub async fn list_playlists(&self, user_id: &str, token: &AccessToken) -> Result<PlaylistsPage> {
        let path = format!("/users/{}/playlists", urlencoding::encode(user_id));
        self.get(&path, token).await
    }

    /// The page of a playlist's tracks starting at `offset`. Never loops: use
    /// [`TrackPager`] to walk the whole playlist. An offset past the end gives
    /// an empty page.
    pub async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        token: &AccessToken,
        offset: u32,
    ) -> Result<TracksPage> {
        let path = format!("/playlists/{}/tracks", urlencoding::encode(playlist_id));
        debug!("GET {} (offset={})", path, offset);

        let request = self
            .http_client
            .get(self.api_endpoint(&path))
            .query(&[("offset", offset)]);
        self.send_json(self.authorized(request, token)).await
    }

    /// Lazy pager over a playlist's tracks, starting at offset 0.
    pub fn track_pages(&self, playlist_id: &str, token: &AccessToken) -> TrackPager {
        TrackPager::new(self.clone(), playlist_id, token.clone())
    }

    pub async fn get_audio_features(
        &self,
        track_id: &str,
        token: &AccessToken,
    ) -> Result<AudioFeatures> {
        let path = format!("/audio-features/{}", urlencoding::encode(track_id));
        self.get(&path, token).await
    }

    pub async fn get_audio_analysis(
        &self,
        track_id: &str,
        token: &AccessToken,
    ) -> Result<AudioAnalysis> {
        let path = format!("/audio-analysis/{}", urlencoding::encode(track_id));
        self.get(&path, token).await
    }

    /// Appends tracks to the end of a playlist. Accepts bare ids or track URIs.
    ///
    /// No deduplication or batch-size check: the API rejects oversized
    /// requests itself. Not retried; on error the playlist state is unknown.
    pub async fn add_tracks<I>(
        &self,
        playlist_id: &str,
        tracks: I,
        token: &AccessToken,
    ) -> Result<Snapshot>
    where
        I: IntoIterator,
        I::Item: Into<TrackUri>,
    {
        self.post_tracks(playlist_id, tracks, None, token).await
    }

    /// Like [`add_tracks`](Self::add_tracks), inserting at a zero-based position.
    pub async fn add_tracks_at<I>(
        &self,
        playlist_id: &str,
        tracks: I,
        position: u32,
        token: &AccessToken,
    ) -> Result<Snapshot>
    where
        I: IntoIterator,
        I::Item: Into<TrackUri>,
    {
        self.post_tracks(playlist_id, tracks, Some(position), token)
            .await
    }

    async fn post_tracks<I>(
        &self,
        playlist_id: &str,
        tracks: I,
        position: Option<u32>,
        token: &AccessToken,
    ) -> Result<Snapshot>
    where
        I: IntoIterator,
        I::Item: Into<TrackUri>,
    {
        let uris: Vec<TrackUri> = tracks.into_iter().map(Into::into).collect();
        let path = format!("/playlists/{}/tracks", urlencoding::encode(playlist_id));
        debug!("POST {} ({} tracks)", path, uris.len());

        let mut request = self
            .http_client
            .post(self.api_endpoint(&path))
            .query(&[("uris", join_uris(&uris))]);
        if let Some(position) = position {
            request = request.query(&[("position", position)]);
        }

        let body: Value = self.send_json(self.authorized(request, token)).await?;
        info!("Added {} tracks to playlist {}", uris.len(), playlist_id);
        Ok(Snapshot::from(body))
    }

    /// Removes tracks from a playlist with a `{"tracks": [...]}` body.
    ///
    /// Entries are matched by URI (and positions, if given) against the
    /// playlist as it is when the request lands. A concurrent reorder between
    /// reading the playlist and this call can remove different entries than
    /// intended; there is no guard against that here.
    pub async fn remove_tracks<I>(
        &self,
        playlist_id: &str,
        tracks: I,
        token: &AccessToken,
    ) -> Result<Snapshot>
    where
        I: IntoIterator,
        I::Item: Into<TrackRemoval>,
    {
        let tracks: Vec<TrackRemoval> = tracks.into_iter().map(Into::into).collect();
        let path = format!("/playlists/{}/tracks", urlencoding::encode(playlist_id));
        debug!("DELETE {} ({} tracks)", path, tracks.len());

        let request = self
            .http_client
            .delete(self.api_endpoint(&path))
            .body(serde_json::to_vec(&RemoveTracksRequest { tracks: &tracks })?);

        let body: Value = self.send_json(self.authorized(request, token)).await?;
        info!("Removed {} tracks from playlist {}", tracks.len(), playlist_id);
        Ok(Snapshot::from(body))
    }
}

/// Validates a base URL and strips the trailing slash so paths can be appended.
fn normalize_base(base: &str) -> Result<String> {
    let url = Url::parse(base).map_err(|e| ApiError::Config(format!("Invalid URL {}: {}", base, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(base.trim_end_matches('/').to_string()),
        scheme => Err(ApiError::Config(format!(
            "Unsupported URL scheme {} in {}",
            scheme, base
        ))),
    }
}
