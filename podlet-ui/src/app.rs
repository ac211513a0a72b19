use std::{
    cell::{Cell, RefCell},
    mem,
    rc::Rc,
    sync::Arc,
};

use podlet_core::catalog::SearchResults;

use crate::{
    ctx::Ctx,
    nav::Navigator,
    page::NavAction,
    pages::{
        boot::{BootPage, BootRendering},
        now_playing::NowPlayingRendering,
        root::root_page,
        search::{results_page, SearchRendering},
    },
    render::{BootSnapshot, MenuSnapshot, NowPlayingSnapshot, Rendering, SearchSnapshot},
};

/// Button events decoded by the embedding environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Select,
    Back,
    Play,
    Prev,
    Next,
}

/// Display backend.  One method per snapshot kind; implementations draw the
/// frame and nothing else.
pub trait Screen {
    fn show_menu(&self, frame: &MenuSnapshot);

    fn show_now_playing(&self, frame: &NowPlayingSnapshot);

    fn show_search(&self, frame: &SearchSnapshot);

    fn show_boot(&self, frame: &BootSnapshot);
}

/// The live rendering currently feeding the screen, if any.
enum LiveBinding {
    None,
    NowPlaying(Rc<NowPlayingRendering>),
    Search(Rc<SearchRendering>),
    Boot(Rc<BootRendering>),
}

/// Page transitions requested from inside subscription callbacks.  The
/// callbacks run mid-refresh, so they only record here; `pump` performs the
/// transition once the rendering is quiescent again.
#[derive(Default)]
struct Pending {
    boot_loaded: Cell<bool>,
    search_results: RefCell<Option<Arc<SearchResults>>>,
}

/// Drives the page tree: routes button input to the current page, keeps the
/// navigation stack, and binds the screen to at most one live rendering at
/// a time.  Starts on the boot screen and swaps to the root menu once the
/// catalog is in.
pub struct App {
    ctx: Ctx,
    nav: Navigator,
    screen: Rc<dyn Screen>,
    live: LiveBinding,
    pending: Rc<Pending>,
}

impl App {
    pub fn new(ctx: Ctx, screen: Rc<dyn Screen>) -> Self {
        let nav = Navigator::new(BootPage::new(ctx.clone()).into_handle());
        Self {
            ctx,
            nav,
            screen,
            live: LiveBinding::None,
            pending: Rc::new(Pending::default()),
        }
    }

    /// Show the boot screen and kick off the catalog load.
    pub fn start(&mut self) {
        self.present();
    }

    pub fn handle_input(&mut self, input: Input) {
        let current = self.nav.current();
        let action = match input {
            Input::Up => {
                current.borrow_mut().nav_up();
                None
            }
            Input::Down => {
                current.borrow_mut().nav_down();
                None
            }
            Input::Select => Some(current.borrow_mut().nav_select()),
            Input::Back => Some(current.borrow_mut().nav_back()),
            Input::Play => {
                current.borrow_mut().nav_play();
                None
            }
            Input::Prev => {
                current.borrow_mut().nav_prev();
                None
            }
            Input::Next => {
                current.borrow_mut().nav_next();
                None
            }
        };
        if let Some(action) = action {
            self.apply(action);
        }
        self.present();
        self.pump();
    }

    /// Perform the page transitions recorded by the live callbacks.  Called
    /// after every input and after every timer pass.
    pub fn pump(&mut self) {
        if self.pending.boot_loaded.take() {
            log::info!("boot complete, mounting the root menu");
            self.unbind();
            self.nav.reset(root_page(&self.ctx));
            self.present();
        }
        let results = self.pending.search_results.take();
        if let Some(results) = results {
            self.unbind();
            self.nav.push(results_page(&self.ctx, results));
            self.present();
        }
    }

    fn apply(&mut self, action: NavAction) {
        match action {
            NavAction::Stay => {}
            NavAction::Push(child) => {
                self.unbind();
                self.nav.push(child);
            }
            NavAction::Pop => {
                if self.nav.pop() {
                    self.unbind();
                }
            }
        }
    }

    fn present(&mut self) {
        let current = self.nav.current();
        let rendering = current.borrow_mut().render();
        match rendering {
            Rendering::Menu(frame) => self.screen.show_menu(&frame),
            Rendering::NowPlaying(live) => self.bind_now_playing(live),
            Rendering::Search(live) => self.bind_search(live),
            Rendering::Boot(live) => self.bind_boot(live),
        }
    }

    fn bind_now_playing(&mut self, live: Rc<NowPlayingRendering>) {
        if let LiveBinding::NowPlaying(bound) = &self.live {
            if Rc::ptr_eq(bound, &live) {
                return;
            }
        }
        self.unbind();
        let screen = Rc::clone(&self.screen);
        live.subscribe(Rc::new(move |frame: &NowPlayingSnapshot| {
            screen.show_now_playing(frame);
        }));
        self.live = LiveBinding::NowPlaying(live);
    }

    fn bind_search(&mut self, live: Rc<SearchRendering>) {
        if let LiveBinding::Search(bound) = &self.live {
            if Rc::ptr_eq(bound, &live) {
                return;
            }
        }
        self.unbind();
        let screen = Rc::clone(&self.screen);
        let pending = Rc::clone(&self.pending);
        live.subscribe(Rc::new(move |frame: &SearchSnapshot| {
            if let Some(results) = &frame.results {
                pending.search_results.replace(Some(Arc::clone(results)));
            }
            screen.show_search(frame);
        }));
        self.live = LiveBinding::Search(live);
    }

    fn bind_boot(&mut self, live: Rc<BootRendering>) {
        if let LiveBinding::Boot(bound) = &self.live {
            if Rc::ptr_eq(bound, &live) {
                return;
            }
        }
        self.unbind();
        let screen = Rc::clone(&self.screen);
        let pending = Rc::clone(&self.pending);
        live.subscribe(Rc::new(move |frame: &BootSnapshot| {
            if frame.is_loaded() {
                pending.boot_loaded.set(true);
            }
            screen.show_boot(frame);
        }));
        self.live = LiveBinding::Boot(live);
    }

    fn unbind(&mut self) {
        match mem::replace(&mut self.live, LiveBinding::None) {
            LiveBinding::None => {}
            LiveBinding::NowPlaying(live) => live.unsubscribe(),
            LiveBinding::Search(live) => live.unsubscribe(),
            LiveBinding::Boot(live) => live.unsubscribe(),
        }
    }
}
