//! Stateless client for the Spotify Web API.
//!
//! Obtain an [`AccessToken`] with [`SpotifyClient::acquire_token`], then pass it
//! to every read or playlist edit. The client keeps no session state.

pub mod config;
pub mod error;
pub mod spotify;

pub use config::Config;
pub use error::{ApiError, Result};
pub use spotify::{
    AccessToken, Credentials, Grant, Page, PlaylistsPage, Snapshot, SpotifyClient, TrackPager,
    TrackRemoval, TrackUri, TracksPage,
};
