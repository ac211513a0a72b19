use std::{collections::HashMap, sync::Arc};

use serde::Deserialize;

use crate::catalog::{Album, Artist, Playlist, Track};

/// Snapshot of the user's catalog, loaded once at boot and shared with the
/// page tree.  Pages index into it; nothing here changes until the next
/// full reload.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Library {
    pub playlists: Vec<Playlist>,
    pub albums: Vec<Album>,
    pub new_releases: Vec<Album>,
    pub artists: Vec<Artist>,
    pub saved_tracks: Vec<Track>,
    /// Tracklists keyed by the playlist or album context URI.
    #[serde(default)]
    pub tracks_by_context: HashMap<Arc<str>, Vec<Track>>,
}

impl Library {
    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    pub fn artist(&self, index: usize) -> Option<&Artist> {
        self.artists.get(index)
    }

    pub fn saved_track_count(&self) -> usize {
        self.saved_tracks.len()
    }

    pub fn saved_track(&self, index: usize) -> Option<&Track> {
        self.saved_tracks.get(index)
    }

    pub fn context_tracks(&self, uri: &str) -> Option<&[Track]> {
        self.tracks_by_context.get(uri).map(Vec::as_slice)
    }
}
