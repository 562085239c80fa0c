use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

use crate::error::{ApiError, Result};

pub const TRACK_URI_PREFIX: &str = "spotify:track:";

/// Audio features record, passed through as returned by the API.
pub type AudioFeatures = Value;

/// Audio analysis record, passed through as returned by the API.
pub type AudioAnalysis = Value;

/// One page of a paginated collection.
///
/// Items are kept as raw JSON; unknown top-level fields land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type PlaylistsPage = Page;
pub type TracksPage = Page;

impl Page {
    /// True when no further page should be requested.
    pub fn is_last(&self) -> bool {
        self.items.is_empty() || self.next.is_none()
    }

    /// Offset of the page following this one, given the offset it was requested at.
    pub fn next_offset(&self, requested: u32) -> u32 {
        self.offset.unwrap_or(requested) + self.items.len() as u32
    }

    /// URIs of the tracks on a playlist tracks page, in page order.
    /// Items without a track (removed or unavailable) are skipped.
    pub fn track_uris(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| item["track"]["uri"].as_str())
            .map(str::to_string)
            .collect()
    }
}

/// A track in `spotify:track:<id>` form, as the playlist endpoints expect it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackUri(String);

impl TrackUri {
    /// Accepts a bare track id or a full track URI; URIs are kept as-is.
    pub fn new(id_or_uri: impl AsRef<str>) -> Self {
        let value = id_or_uri.as_ref().trim();
        if value.starts_with(TRACK_URI_PREFIX) {
            Self(value.to_string())
        } else {
            Self(format!("{}{}", TRACK_URI_PREFIX, value))
        }
    }

    /// Parse a track reference. Supports formats:
    /// - 4uLU6hMCjMI75M1A2tKUQC
    /// - spotify:track:4uLU6hMCjMI75M1A2tKUQC
    /// - https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC?si=...
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ApiError::Config("Empty track reference".into()));
        }

        if !input.contains("://") {
            return Ok(Self::new(input));
        }

        let url = Url::parse(input).map_err(|e| ApiError::Config(format!("Invalid URL: {}", e)))?;

        let path_segments: Vec<&str> = url
            .path_segments()
            .ok_or_else(|| ApiError::Config("Invalid Spotify URL".into()))?
            .collect();

        // Expect /track/{id}
        match path_segments.as_slice() {
            ["track", id, ..] if !id.is_empty() => Ok(Self::new(id)),
            _ => Err(ApiError::Config(
                "URL does not appear to be a Spotify track URL".into(),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn id(&self) -> &str {
        self.0.strip_prefix(TRACK_URI_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for TrackUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&String> for TrackUri {
    fn from(value: &String) -> Self {
        Self::new(value)
    }
}

impl From<String> for TrackUri {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Joins URIs into the comma-separated form of the `uris` query parameter.
pub fn join_uris(uris: &[TrackUri]) -> String {
    uris.iter()
        .map(TrackUri::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// One entry of a remove-tracks request body.
///
/// Without `positions` every occurrence of the URI is removed. With
/// `positions` only those indexes are targeted, and they refer to the
/// playlist as it is at request time: if it was reordered since it was read,
/// the entries removed may not be the ones intended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRemoval {
    pub uri: TrackUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<u32>>,
}

impl TrackRemoval {
    pub fn all(uri: impl Into<TrackUri>) -> Self {
        Self {
            uri: uri.into(),
            positions: None,
        }
    }

    pub fn at(uri: impl Into<TrackUri>, positions: Vec<u32>) -> Self {
        Self {
            uri: uri.into(),
            positions: Some(positions),
        }
    }
}

impl From<TrackUri> for TrackRemoval {
    fn from(uri: TrackUri) -> Self {
        Self::all(uri)
    }
}

impl From<&str> for TrackRemoval {
    fn from(value: &str) -> Self {
        Self::all(value)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoveTracksRequest<'a> {
    pub tracks: &'a [TrackRemoval],
}

/// Result of a playlist mutation: the new snapshot id plus the raw body.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub snapshot_id: Option<String>,
    pub raw: Value,
}

impl From<Value> for Snapshot {
    fn from(raw: Value) -> Self {
        let snapshot_id = raw["snapshot_id"].as_str().map(str::to_string);
        Self { snapshot_id, raw }
    }
}
