//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

use spotify_playlist_api::{AccessToken, SpotifyClient};

pub const TOKEN: &str = "BQDmocktoken";

pub fn token() -> AccessToken {
    AccessToken::new(TOKEN)
}

pub fn bearer() -> String {
    format!("Bearer {}", TOKEN)
}

pub fn client_for(server: &MockServer) -> SpotifyClient {
    SpotifyClient::with_endpoints(&server.uri(), &format!("{}/v1", server.uri())).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("spotify_playlist_api=debug")
        .with_test_writer()
        .try_init();
}

/// In-memory playlist answering the GET/POST/DELETE calls on
/// `/v1/playlists/{id}/tracks` the way the Web API does.
#[derive(Clone)]
pub struct FakePlaylist {
    uris: Arc<Mutex<Vec<String>>>,
    page_size: usize,
    snapshots: Arc<Mutex<u32>>,
    max_batch: usize,
}

impl FakePlaylist {
    pub fn new(uris: &[&str], page_size: usize) -> Self {
        Self {
            uris: Arc::new(Mutex::new(uris.iter().map(|u| u.to_string()).collect())),
            page_size,
            snapshots: Arc::new(Mutex::new(0)),
            max_batch: 100,
        }
    }

    pub fn with_tracks(count: usize, page_size: usize) -> Self {
        let uris: Vec<String> = (0..count).map(|i| format!("spotify:track:t{:03}", i)).collect();
        let refs: Vec<&str> = uris.iter().map(String::as_str).collect();
        Self::new(&refs, page_size)
    }

    pub fn uris(&self) -> Vec<String> {
        self.uris.lock().unwrap().clone()
    }

    /// Simulates another writer editing the playlist.
    pub fn insert(&self, position: usize, uri: &str) {
        self.uris.lock().unwrap().insert(position, uri.to_string());
    }

    fn snapshot(&self, status: u16) -> ResponseTemplate {
        let mut n = self.snapshots.lock().unwrap();
        *n += 1;
        ResponseTemplate::new(status).set_body_json(json!({ "snapshot_id": format!("snap-{}", n) }))
    }

    fn bad_request(message: &str) -> ResponseTemplate {
        ResponseTemplate::new(400)
            .set_body_json(json!({ "error": { "status": 400, "message": message } }))
    }

    fn query(request: &Request, key: &str) -> Option<String> {
        request
            .url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    fn page(&self, request: &Request) -> ResponseTemplate {
        let uris = self.uris.lock().unwrap();
        let offset: usize = Self::query(request, "offset")
            .and_then(|o| o.parse().ok())
            .unwrap_or(0);

        let end = (offset + self.page_size).min(uris.len());
        let items: Vec<Value> = uris
            .get(offset..end)
            .unwrap_or(&[])
            .iter()
            .map(|uri| json!({ "added_at": "2024-01-01T00:00:00Z", "track": { "uri": uri } }))
            .collect();

        let mut base = request.url.clone();
        base.set_query(None);
        let next = (end < uris.len()).then(|| format!("{}?offset={}&limit={}", base, end, self.page_size));

        ResponseTemplate::new(200).set_body_json(json!({
            "href": request.url.as_str(),
            "items": items,
            "limit": self.page_size,
            "next": next,
            "offset": offset,
            "previous": null,
            "total": uris.len(),
        }))
    }

    fn add(&self, request: &Request) -> ResponseTemplate {
        let Some(uris) = Self::query(request, "uris") else {
            return Self::bad_request("No uris provided");
        };
        let added: Vec<String> = uris.split(',').map(str::to_string).collect();
        if added.len() > self.max_batch {
            return Self::bad_request("You can add a maximum of 100 tracks per request.");
        }

        {
            let mut current = self.uris.lock().unwrap();
            let position = Self::query(request, "position")
                .and_then(|p| p.parse::<usize>().ok())
                .unwrap_or(current.len())
                .min(current.len());
            for (i, uri) in added.into_iter().enumerate() {
                current.insert(position + i, uri);
            }
        }

        self.snapshot(201)
    }

    fn remove(&self, request: &Request) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return Self::bad_request("Invalid JSON");
        };
        let Some(tracks) = body["tracks"].as_array() else {
            return Self::bad_request("Missing tracks");
        };

        {
            let mut current = self.uris.lock().unwrap();
            for track in tracks {
                let uri = track["uri"].as_str().unwrap_or_default();
                match track["positions"].as_array() {
                    Some(positions) => {
                        let mut positions: Vec<usize> =
                            positions.iter().filter_map(|p| p.as_u64()).map(|p| p as usize).collect();
                        positions.sort_unstable_by(|a, b| b.cmp(a));
                        for position in positions {
                            if current.get(position).map(String::as_str) != Some(uri) {
                                return Self::bad_request("Could not remove tracks, please check parameters.");
                            }
                            current.remove(position);
                        }
                    }
                    None => current.retain(|u| u != uri),
                }
            }
        }

        self.snapshot(200)
    }
}

impl Respond for FakePlaylist {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match request.method.as_str() {
            "GET" => self.page(request),
            "POST" => self.add(request),
            "DELETE" => self.remove(request),
            _ => ResponseTemplate::new(405),
        }
    }
}
