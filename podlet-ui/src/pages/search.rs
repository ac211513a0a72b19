use std::{cell::RefCell, rc::Rc, sync::Arc};

use podlet_core::{catalog::SearchResults, dispatch::Handoff, error::Error};

use crate::{
    command::{DeferredPlay, PlayAction},
    ctx::Ctx,
    menu::{MenuPage, PlaceholderPage, RowSource},
    page::{NavAction, Page, PageHandle},
    pages::{library::TracklistSource, now_playing::NowPlayingPage},
    render::{Rendering, SearchSnapshot},
    subscription::Subscription,
};

/// Queries longer than this are refused, matching the display width.
pub const QUERY_MAX_CHARS: usize = 16;

/// Wheel position of the space character, one past `z`.
const WHEEL_SPACE: u8 = 26;

struct SearchState {
    query: String,
    active_char: u8,
    loading: bool,
    results: Option<Arc<SearchResults>>,
}

/// Live search-entry view.  The character wheel and query edits refresh
/// immediately; a dispatched query flips `loading` and the refresh timer
/// polls the handoff slot until the worker posts, delivering the results in
/// exactly one frame.
pub struct SearchRendering {
    ctx: Ctx,
    subscription: Subscription<SearchSnapshot>,
    state: RefCell<SearchState>,
    handoff: Handoff<Result<SearchResults, Error>>,
}

impl SearchRendering {
    pub fn new(ctx: Ctx) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            subscription: Subscription::new(),
            state: RefCell::new(SearchState {
                query: String::new(),
                active_char: 0,
                loading: false,
                results: None,
            }),
            handoff: Handoff::new(),
        })
    }

    pub fn subscribe(self: &Rc<Self>, callback: Rc<dyn Fn(&SearchSnapshot)>) {
        if self.subscription.install(callback) {
            self.refresh();
        }
    }

    pub fn unsubscribe(&self) {
        self.subscription.clear(self.ctx.timers.as_ref());
    }

    pub fn wheel_up(self: &Rc<Self>) {
        {
            let mut state = self.state.borrow_mut();
            state.active_char = if state.active_char == WHEEL_SPACE {
                0
            } else {
                state.active_char + 1
            };
        }
        self.refresh();
    }

    pub fn wheel_down(self: &Rc<Self>) {
        {
            let mut state = self.state.borrow_mut();
            state.active_char = if state.active_char == 0 {
                WHEEL_SPACE
            } else {
                state.active_char - 1
            };
        }
        self.refresh();
    }

    pub fn append_active(self: &Rc<Self>) {
        {
            let mut state = self.state.borrow_mut();
            if state.query.len() >= QUERY_MAX_CHARS {
                return;
            }
            let glyph = wheel_glyph(state.active_char);
            state.query.push(glyph);
        }
        self.refresh();
    }

    pub fn backspace(self: &Rc<Self>) {
        self.state.borrow_mut().query.pop();
        self.refresh();
    }

    /// Dispatch the current query to the client.  `loading` is set here, on
    /// the render thread; the worker only posts into the handoff slot.
    pub fn run_query(self: &Rc<Self>) {
        let query = {
            let mut state = self.state.borrow_mut();
            state.loading = true;
            state.query.clone()
        };
        log::debug!("searching for {query:?}");
        let api = Arc::clone(&self.ctx.api);
        let sender = self.handoff.sender();
        self.ctx
            .dispatcher
            .run_async(move || sender.post(api.search(&query)));
        self.refresh();
    }

    pub fn query(&self) -> String {
        self.state.borrow().query.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn refresh(self: &Rc<Self>) {
        if !self.subscription.is_subscribed() {
            return;
        }
        let snapshot = {
            let mut state = self.state.borrow_mut();
            if state.loading {
                if let Some(result) = self.handoff.try_take() {
                    state.loading = false;
                    match result {
                        Ok(results) => state.results = Some(Arc::new(results)),
                        Err(err) => log::error!("search failed: {err}"),
                    }
                }
            }
            SearchSnapshot {
                query: state.query.clone(),
                active_char: wheel_glyph(state.active_char),
                loading: state.loading,
                // One-shot delivery: the frame that carries results is the
                // only one that ever will.
                results: state.results.take(),
            }
        };
        self.subscription.emit(&snapshot);
        if snapshot.loading {
            let this = Rc::clone(self);
            self.subscription
                .schedule(self.ctx.timers.as_ref(), move || this.refresh());
        } else {
            self.subscription.cancel_timer(self.ctx.timers.as_ref());
        }
    }
}

fn wheel_glyph(position: u8) -> char {
    if position == WHEEL_SPACE {
        ' '
    } else {
        (b'a' + position) as char
    }
}

/// Text-entry screen: up/down turn the character wheel, next appends,
/// prev deletes, select runs the query.
pub struct SearchPage {
    ctx: Ctx,
    live: Rc<SearchRendering>,
}

impl SearchPage {
    pub fn new(ctx: Ctx) -> Self {
        let live = SearchRendering::new(ctx.clone());
        Self { ctx, live }
    }

    pub fn into_handle(self) -> PageHandle {
        Rc::new(RefCell::new(self))
    }

    #[cfg(test)]
    pub(crate) fn live(&self) -> Rc<SearchRendering> {
        Rc::clone(&self.live)
    }
}

impl Page for SearchPage {
    fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    fn header(&self) -> Arc<str> {
        "Search".into()
    }

    fn has_sub_page(&self) -> bool {
        true
    }

    fn nav_up(&mut self) {
        self.live.wheel_up();
    }

    fn nav_down(&mut self) {
        self.live.wheel_down();
    }

    fn nav_select(&mut self) -> NavAction {
        self.live.run_query();
        NavAction::Stay
    }

    fn nav_play(&mut self) {}

    fn nav_prev(&mut self) {
        self.live.backspace();
    }

    fn nav_next(&mut self) {
        self.live.append_active();
    }

    fn render(&mut self) -> Rendering {
        Rendering::Search(Rc::clone(&self.live))
    }
}

/// Result rows interleaved with unselectable TRACKS/ARTISTS/ALBUMS section
/// headers.  Section counts are padded by one for their header; the cursor
/// starts under the first header and jumps over the others.
pub struct SearchResultsSource {
    results: Arc<SearchResults>,
    tracks: usize,
    artists: usize,
    albums: usize,
    header_indices: [usize; 3],
}

impl SearchResultsSource {
    pub fn new(results: Arc<SearchResults>) -> Self {
        let tracks = pad_section(results.tracks.len());
        let artists = pad_section(results.artists.len());
        let albums = pad_section(results.albums.len());
        let header_indices = [0, tracks, tracks + artists];
        Self {
            results,
            tracks,
            artists,
            albums,
            header_indices,
        }
    }

    #[cfg(test)]
    pub(crate) fn header_indices(&self) -> [usize; 3] {
        self.header_indices
    }
}

fn pad_section(count: usize) -> usize {
    if count > 0 {
        count + 1
    } else {
        0
    }
}

impl RowSource for SearchResultsSource {
    fn title(&self) -> Arc<str> {
        "Search Results".into()
    }

    fn total(&mut self, _ctx: &Ctx) -> usize {
        self.tracks + self.artists + self.albums
    }

    fn row(&mut self, ctx: &Ctx, index: usize) -> Option<PageHandle> {
        if self.tracks > 0 && index < self.tracks {
            if index == 0 {
                return Some(PlaceholderPage::section(ctx.clone(), "TRACKS").into_handle());
            }
            let track = self.results.tracks.get(index - 1)?;
            let command = DeferredPlay::new(PlayAction::Track {
                uri: Arc::clone(&track.uri),
            });
            return Some(
                NowPlayingPage::new(ctx.clone(), Arc::clone(&track.title), command).into_handle(),
            );
        }
        if self.artists > 0 && index < self.tracks + self.artists {
            let base = self.tracks;
            if index == base {
                return Some(PlaceholderPage::section(ctx.clone(), "ARTISTS").into_handle());
            }
            let artist = self.results.artists.get(index - base - 1)?;
            let command = DeferredPlay::new(PlayAction::Artist {
                uri: Arc::clone(&artist.uri),
            });
            return Some(
                NowPlayingPage::new(ctx.clone(), Arc::clone(&artist.name), command).into_handle(),
            );
        }
        if self.albums > 0 {
            let base = self.tracks + self.artists;
            if index == base {
                return Some(PlaceholderPage::section(ctx.clone(), "ALBUMS").into_handle());
            }
            let album = self.results.albums.get(index.checked_sub(base + 1)?)?;
            let tracks = self
                .results
                .album_tracks
                .get(&album.uri)
                .cloned()
                .unwrap_or_default();
            let source = TracklistSource::in_memory(album, tracks);
            return Some(MenuPage::new(ctx.clone(), source).into_handle());
        }
        None
    }

    fn jump_up(&self, index: usize) -> usize {
        if self.header_indices.contains(&(index + 1)) {
            2
        } else {
            1
        }
    }

    fn jump_down(&self, index: usize) -> usize {
        match index.checked_sub(1) {
            Some(previous) if self.header_indices.contains(&previous) => 2,
            _ => 1,
        }
    }

    fn initial_index(&self) -> usize {
        1
    }
}

pub fn results_page(ctx: &Ctx, results: Arc<SearchResults>) -> PageHandle {
    MenuPage::new(ctx.clone(), SearchResultsSource::new(results)).into_handle()
}
