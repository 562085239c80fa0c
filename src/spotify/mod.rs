pub mod auth;
pub mod client;
pub mod models;
pub mod pager;

pub use auth::{AccessToken, Credentials, Grant};
pub use client::SpotifyClient;
pub use models::{
    AudioAnalysis, AudioFeatures, Page, PlaylistsPage, Snapshot, TrackRemoval, TrackUri,
    TracksPage, TRACK_URI_PREFIX,
};
pub use pager::TrackPager;
