use std::{rc::Rc, sync::Arc};

use podlet_core::catalog::{NowPlaying, SearchResults};

use crate::pages::{
    boot::BootRendering, now_playing::NowPlayingRendering, search::SearchRendering,
};

/// Visual style of a menu row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Normal,
    Highlighted,
    Title,
}

/// One row of a menu frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    pub title: Arc<str>,
    pub kind: LineKind,
    pub show_arrow: bool,
    pub selectable: bool,
    pub value: Option<Arc<str>>,
}

impl LineItem {
    /// Placeholder row for window slots past the end of the list.
    pub fn empty() -> Self {
        Self {
            title: "".into(),
            kind: LineKind::Normal,
            show_arrow: false,
            selectable: true,
            value: None,
        }
    }
}

/// Complete frame of a windowed menu, pulled from the page on demand.
#[derive(Clone, Debug)]
pub struct MenuSnapshot {
    pub header: Arc<str>,
    pub lines: Vec<LineItem>,
    pub cursor_index: usize,
    pub total_count: usize,
    pub now_playing: Option<NowPlaying>,
    pub has_internet: bool,
}

/// Frame pushed by the now-playing rendering.  `volume_preview` marks the
/// synthesized frames shown while the user is adjusting volume.
#[derive(Clone, Debug)]
pub struct NowPlayingSnapshot {
    pub playing: Option<NowPlaying>,
    pub volume: u8,
    pub volume_preview: bool,
}

/// Frame pushed by the search rendering.  `results` is delivered in exactly
/// one frame after a query completes, then cleared.
#[derive(Clone, Debug)]
pub struct SearchSnapshot {
    pub query: String,
    pub active_char: char,
    pub loading: bool,
    pub results: Option<Arc<SearchResults>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BootSnapshot {
    Loading,
    Loaded,
    Failed(Arc<str>),
}

impl BootSnapshot {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

/// What a page displays: a complete menu frame, or a handle to a live
/// rendering the consumer subscribes to.
pub enum Rendering {
    Menu(MenuSnapshot),
    NowPlaying(Rc<NowPlayingRendering>),
    Search(Rc<SearchRendering>),
    Boot(Rc<BootRendering>),
}
