use std::{collections::HashMap, sync::Arc, time::Duration};

use itertools::Itertools;
use serde::{Deserialize, Deserializer};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Track {
    pub uri: Arc<str>,
    pub title: Arc<str>,
    #[serde(default)]
    pub artists: Vec<Arc<str>>,
    #[serde(rename = "duration_ms")]
    #[serde(deserialize_with = "deserialize_millis")]
    #[serde(default)]
    pub duration: Duration,
}

impl Track {
    pub fn artist_name(&self) -> Arc<str> {
        self.artists
            .first()
            .cloned()
            .unwrap_or_else(|| "Unknown".into())
    }

    pub fn artist_names(&self) -> String {
        self.artists.iter().join(", ")
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Album {
    pub uri: Arc<str>,
    pub name: Arc<str>,
    #[serde(default = "default_str")]
    pub artist: Arc<str>,
    pub track_count: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Artist {
    pub uri: Arc<str>,
    pub name: Arc<str>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Playlist {
    pub uri: Arc<str>,
    pub name: Arc<str>,
    pub track_count: usize,
    /// Position of the playlist in the user's library ordering.
    #[serde(default)]
    pub idx: usize,
}

/// Playback state snapshot as reported by the remote client.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NowPlaying {
    pub name: Arc<str>,
    pub artist: Arc<str>,
    pub album: Arc<str>,
    #[serde(default = "default_str")]
    pub context_name: Arc<str>,
    pub is_playing: bool,
    #[serde(deserialize_with = "deserialize_millis")]
    #[serde(default)]
    pub progress: Duration,
    #[serde(deserialize_with = "deserialize_millis")]
    #[serde(default)]
    pub duration: Duration,
    pub track_index: Option<usize>,
}

/// Paired or available output device, for the Bluetooth and audio screens.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Device {
    pub name: Arc<str>,
    pub address: Arc<str>,
    pub connected: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SearchResults {
    pub tracks: Vec<Track>,
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    /// Tracklists of the returned albums, keyed by album URI.
    #[serde(default)]
    pub album_tracks: HashMap<Arc<str>, Vec<Track>>,
}

pub fn default_str() -> Arc<str> {
    "".into()
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer).unwrap_or(0);
    Ok(Duration::from_millis(millis))
}
