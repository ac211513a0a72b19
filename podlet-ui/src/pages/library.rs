use std::sync::Arc;

use once_cell::sync::Lazy;
use podlet_core::catalog::{Album, Track};
use regex::Regex;

use crate::{
    command::{DeferredPlay, PlayAction},
    ctx::Ctx,
    menu::{MenuPage, PageCache, RowSource},
    page::PageHandle,
    pages::now_playing::NowPlayingPage,
};

/// Emoji ranges commonly decorating playlist names; they have no glyphs on
/// the device font and are stripped from headers.
static EMOJI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "[",
        "\u{1F600}-\u{1F64F}", // emoticons
        "\u{1F300}-\u{1F5FF}", // symbols and pictographs
        "\u{1F680}-\u{1F6FF}", // transport and map symbols
        "\u{1F1E0}-\u{1F1FF}", // regional indicator flags
        "]+",
    ))
    .expect("emoji pattern compiles")
});

pub fn clean_name(name: &str) -> Arc<str> {
    Arc::from(EMOJI_PATTERN.replace_all(name, "").as_ref())
}

#[derive(Clone)]
struct ContextEntry {
    uri: Arc<str>,
    name: Arc<str>,
    track_count: usize,
}

/// Playlist-or-album collection screen.  Children are tracklist pages,
/// materialized on first access and kept in a bounded cache.
pub struct ContextListSource {
    title: Arc<str>,
    entries: Vec<ContextEntry>,
    cache: PageCache,
}

impl ContextListSource {
    pub fn playlists(ctx: &Ctx) -> Self {
        let mut playlists = ctx
            .library()
            .map(|library| library.playlists.clone())
            .unwrap_or_default();
        // Restore the ordering the user arranged in their library.
        playlists.sort_by_key(|playlist| playlist.idx);
        let entries = playlists
            .into_iter()
            .map(|playlist| ContextEntry {
                uri: playlist.uri,
                name: clean_name(&playlist.name),
                track_count: playlist.track_count,
            })
            .collect();
        Self::new("Playlists", entries, ctx)
    }

    pub fn albums(ctx: &Ctx) -> Self {
        let entries = ctx
            .library()
            .map(|library| library.albums.iter().map(album_entry).collect())
            .unwrap_or_default();
        Self::new("Albums", entries, ctx)
    }

    pub fn new_releases(ctx: &Ctx) -> Self {
        let entries = ctx
            .library()
            .map(|library| library.new_releases.iter().map(album_entry).collect())
            .unwrap_or_default();
        Self::new("New Releases", entries, ctx)
    }

    fn new(title: &str, entries: Vec<ContextEntry>, ctx: &Ctx) -> Self {
        Self {
            title: title.into(),
            entries,
            cache: PageCache::new(ctx.config.page_cache_size),
        }
    }

    #[cfg(test)]
    pub(crate) fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

fn album_entry(album: &Album) -> ContextEntry {
    ContextEntry {
        uri: Arc::clone(&album.uri),
        name: clean_name(&album.name),
        track_count: album.track_count,
    }
}

impl RowSource for ContextListSource {
    fn title(&self) -> Arc<str> {
        self.title.clone()
    }

    fn total(&mut self, _ctx: &Ctx) -> usize {
        self.entries.len()
    }

    fn row(&mut self, ctx: &Ctx, index: usize) -> Option<PageHandle> {
        let entries = &self.entries;
        self.cache.get_or_insert(index, || {
            let entry = entries.get(index)?.clone();
            Some(MenuPage::new(ctx.clone(), TracklistSource::from_entry(entry)).into_handle())
        })
    }
}

/// Tracks of a single playlist or album.  The row count comes from the
/// entry; the tracks themselves are resolved from the library on first
/// access.  Rows are built fresh on every access so that reselecting a
/// track starts it again.
pub struct TracklistSource {
    header: Arc<str>,
    context_uri: Arc<str>,
    track_count: usize,
    tracks: Option<Vec<Track>>,
}

impl TracklistSource {
    fn from_entry(entry: ContextEntry) -> Self {
        Self {
            header: entry.name,
            context_uri: entry.uri,
            track_count: entry.track_count,
            tracks: None,
        }
    }

    /// Tracklist already in hand, as delivered with album search results.
    pub fn in_memory(album: &Album, tracks: Vec<Track>) -> Self {
        Self {
            header: clean_name(&album.name),
            context_uri: Arc::clone(&album.uri),
            track_count: album.track_count,
            tracks: Some(tracks),
        }
    }

    fn tracks(&mut self, ctx: &Ctx) -> &[Track] {
        if self.tracks.is_none() {
            let resolved = ctx
                .library()
                .and_then(|library| library.context_tracks(&self.context_uri).map(<[Track]>::to_vec))
                .unwrap_or_default();
            self.tracks = Some(resolved);
        }
        self.tracks.as_deref().unwrap_or(&[])
    }
}

impl RowSource for TracklistSource {
    fn title(&self) -> Arc<str> {
        self.header.clone()
    }

    fn total(&mut self, _ctx: &Ctx) -> usize {
        self.track_count
    }

    fn row(&mut self, ctx: &Ctx, index: usize) -> Option<PageHandle> {
        let context_uri = Arc::clone(&self.context_uri);
        let track = self.tracks(ctx).get(index)?;
        let command = DeferredPlay::new(PlayAction::FromPlaylist {
            context_uri,
            track_uri: Arc::clone(&track.uri),
        });
        Some(NowPlayingPage::new(ctx.clone(), Arc::clone(&track.title), command).into_handle())
    }
}

/// Followed artists; selecting one starts artist radio on the now-playing
/// screen.
pub struct ArtistsSource {
    cache: PageCache,
}

impl ArtistsSource {
    pub fn new(ctx: &Ctx) -> Self {
        Self {
            cache: PageCache::new(ctx.config.page_cache_size),
        }
    }

    #[cfg(test)]
    pub(crate) fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl RowSource for ArtistsSource {
    fn title(&self) -> Arc<str> {
        "Artists".into()
    }

    fn total(&mut self, ctx: &Ctx) -> usize {
        ctx.library().map(|library| library.artist_count()).unwrap_or(0)
    }

    fn row(&mut self, ctx: &Ctx, index: usize) -> Option<PageHandle> {
        let library = ctx.library()?;
        self.cache.get_or_insert(index, || {
            let artist = library.artist(index)?;
            let command = DeferredPlay::new(PlayAction::Artist {
                uri: Arc::clone(&artist.uri),
            });
            Some(
                NowPlayingPage::new(ctx.clone(), Arc::clone(&artist.name), command).into_handle(),
            )
        })
    }
}

/// The user's liked tracks.  Rows are uncached like tracklist rows, so a
/// reselected track plays again.
pub struct SavedTracksSource;

impl RowSource for SavedTracksSource {
    fn title(&self) -> Arc<str> {
        "Saved Tracks".into()
    }

    fn total(&mut self, ctx: &Ctx) -> usize {
        ctx.library()
            .map(|library| library.saved_track_count())
            .unwrap_or(0)
    }

    fn row(&mut self, ctx: &Ctx, index: usize) -> Option<PageHandle> {
        let library = ctx.library()?;
        let track = library.saved_track(index)?;
        let command = DeferredPlay::new(PlayAction::Track {
            uri: Arc::clone(&track.uri),
        });
        Some(NowPlayingPage::new(ctx.clone(), Arc::clone(&track.title), command).into_handle())
    }
}
