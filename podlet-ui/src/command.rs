use std::sync::Arc;

use podlet_core::client::MusicApi;

use crate::ctx::Ctx;

/// Playback start request captured when a row is selected, inspectable
/// until it runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayAction {
    Track { uri: Arc<str> },
    Artist { uri: Arc<str> },
    FromPlaylist { context_uri: Arc<str>, track_uri: Arc<str> },
}

impl PlayAction {
    pub fn dispatch(&self, api: &dyn MusicApi) {
        match self {
            Self::Track { uri } => api.play_track(uri),
            Self::Artist { uri } => api.play_artist(uri),
            Self::FromPlaylist { context_uri, track_uri } => {
                api.play_from_playlist(context_uri, track_uri)
            }
        }
    }
}

/// One-shot playback command bound to a now-playing page.  `run` is invoked
/// from the page's first render, never from selection or construction, so
/// speculative page materialization stays side-effect free.
#[derive(Clone, Debug)]
pub struct DeferredPlay {
    action: Option<PlayAction>,
    has_run: bool,
}

impl DeferredPlay {
    pub fn new(action: PlayAction) -> Self {
        Self {
            action: Some(action),
            has_run: false,
        }
    }

    /// Command that flips `has_run` without starting anything.  Used by the
    /// root menu's Now Playing entry.
    pub fn none() -> Self {
        Self {
            action: None,
            has_run: false,
        }
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    pub fn action(&self) -> Option<&PlayAction> {
        self.action.as_ref()
    }

    pub fn run(&mut self, ctx: &Ctx) {
        self.has_run = true;
        let Some(action) = self.action.clone() else {
            return;
        };
        let api = Arc::clone(&ctx.api);
        ctx.dispatcher.run_async(move || action.dispatch(api.as_ref()));
    }
}
