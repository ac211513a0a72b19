use crate::{
    catalog::{NowPlaying, SearchResults},
    error::Error,
    library::Library,
};

/// Global playback actions forwarded from the transport buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportCommand {
    Previous,
    Next,
    TogglePlay,
}

/// Remote music service used by the page tree.  Calls are made either from
/// the render thread (cheap state reads) or from dispatched workers (search,
/// the boot load, transport), so implementations must be shareable across
/// threads.
pub trait MusicApi: Send + Sync {
    /// Current playback snapshot, if anything is playing.
    fn now_playing(&self) -> Option<NowPlaying>;

    fn has_internet(&self) -> bool;

    fn search(&self, query: &str) -> Result<SearchResults, Error>;

    fn play_previous(&self);

    fn play_next(&self);

    fn toggle_play(&self);

    fn play_track(&self, uri: &str);

    fn play_artist(&self, uri: &str);

    fn play_from_playlist(&self, context_uri: &str, track_uri: &str);

    /// Load the full library snapshot.  Called once from the boot worker.
    fn refresh_data(&self) -> Result<Library, Error>;

    /// Reduced boot load used on development devices without catalog access.
    fn refresh_devices(&self) -> Result<Library, Error>;
}

impl dyn MusicApi {
    pub fn transport(&self, command: TransportCommand) {
        match command {
            TransportCommand::Previous => self.play_previous(),
            TransportCommand::Next => self.play_next(),
            TransportCommand::TogglePlay => self.toggle_play(),
        }
    }
}
