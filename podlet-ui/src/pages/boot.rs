use std::{cell::RefCell, rc::Rc, sync::Arc};

use podlet_core::{dispatch::Handoff, error::Error, library::Library};

use crate::{
    ctx::Ctx,
    page::{NavAction, Page, PageHandle},
    render::{BootSnapshot, Rendering},
    subscription::Subscription,
};

enum BootState {
    NotStarted,
    Loading,
    Loaded(Arc<Library>),
    Failed(Arc<str>),
}

/// Bootstrap loader.  The first subscription dispatches the catalog load to
/// a worker; every refresh tick polls the handoff slot without blocking and
/// reports progress until the load lands in `Loaded` or `Failed`, both
/// terminal.
pub struct BootRendering {
    ctx: Ctx,
    subscription: Subscription<BootSnapshot>,
    state: RefCell<BootState>,
    handoff: Handoff<Result<Library, Error>>,
}

impl BootRendering {
    pub fn new(ctx: Ctx) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            subscription: Subscription::new(),
            state: RefCell::new(BootState::NotStarted),
            handoff: Handoff::new(),
        })
    }

    pub fn subscribe(self: &Rc<Self>, callback: Rc<dyn Fn(&BootSnapshot)>) {
        if self.subscription.install(callback) {
            self.refresh();
        }
    }

    pub fn unsubscribe(&self) {
        self.subscription.clear(self.ctx.timers.as_ref());
    }

    /// The loaded catalog, once the machine has reached `Loaded`.
    pub fn library(&self) -> Option<Arc<Library>> {
        match &*self.state.borrow() {
            BootState::Loaded(library) => Some(Arc::clone(library)),
            _ => None,
        }
    }

    pub fn refresh(self: &Rc<Self>) {
        if !self.subscription.is_subscribed() {
            return;
        }
        self.advance();
        self.subscription.emit(&self.snapshot());
        let this = Rc::clone(self);
        self.subscription
            .schedule(self.ctx.timers.as_ref(), move || this.refresh());
    }

    fn advance(&self) {
        if matches!(&*self.state.borrow(), BootState::NotStarted) {
            // Mark loading before the worker exists, so a re-entrant
            // refresh can never dispatch twice.
            self.state.replace(BootState::Loading);
            self.start_load();
            return;
        }
        if !matches!(&*self.state.borrow(), BootState::Loading) {
            return;
        }
        let Some(result) = self.handoff.try_take() else {
            return;
        };
        let next = match result {
            Ok(library) => {
                let library = Arc::new(library);
                log::info!(
                    "library loaded: {} playlists, {} albums, {} artists",
                    library.playlists.len(),
                    library.albums.len(),
                    library.artists.len()
                );
                self.ctx.set_library(Arc::clone(&library));
                BootState::Loaded(library)
            }
            Err(err) => {
                log::error!("boot load failed: {err}");
                BootState::Failed(err.to_string().into())
            }
        };
        self.state.replace(next);
    }

    fn start_load(&self) {
        let api = Arc::clone(&self.ctx.api);
        let sender = self.handoff.sender();
        let test_mode = self.ctx.config.test_mode;
        self.ctx.dispatcher.run_async(move || {
            let result = if test_mode {
                api.refresh_devices()
            } else {
                api.refresh_data()
            };
            sender.post(result);
        });
    }

    fn snapshot(&self) -> BootSnapshot {
        match &*self.state.borrow() {
            BootState::NotStarted | BootState::Loading => BootSnapshot::Loading,
            BootState::Loaded(_) => BootSnapshot::Loaded,
            BootState::Failed(reason) => BootSnapshot::Failed(Arc::clone(reason)),
        }
    }
}

/// First screen after power-on.  Navigation is inert until the app swaps in
/// the root menu; transport buttons are ignored because the client is not
/// up yet.
pub struct BootPage {
    ctx: Ctx,
    live: Rc<BootRendering>,
}

impl BootPage {
    pub fn new(ctx: Ctx) -> Self {
        let live = BootRendering::new(ctx.clone());
        Self { ctx, live }
    }

    pub fn into_handle(self) -> PageHandle {
        Rc::new(RefCell::new(self))
    }
}

impl Page for BootPage {
    fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    fn header(&self) -> Arc<str> {
        "Podlet".into()
    }

    fn has_sub_page(&self) -> bool {
        false
    }

    fn nav_up(&mut self) {}

    fn nav_down(&mut self) {}

    fn nav_select(&mut self) -> NavAction {
        NavAction::Stay
    }

    fn nav_back(&mut self) -> NavAction {
        NavAction::Stay
    }

    fn nav_play(&mut self) {}

    fn nav_prev(&mut self) {}

    fn nav_next(&mut self) {}

    fn render(&mut self) -> Rendering {
        Rendering::Boot(Rc::clone(&self.live))
    }
}
