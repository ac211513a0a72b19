use std::{cell::RefCell, rc::Rc, sync::Arc};

use podlet_core::client::TransportCommand;

use crate::{ctx::Ctx, render::Rendering};

/// Shared handle to a page held by the navigation stack or by a parent's
/// materialization cache.
pub type PageHandle = Rc<RefCell<dyn Page>>;

/// Where the display goes after an input.
pub enum NavAction {
    Stay,
    Push(PageHandle),
    Pop,
}

/// A navigable screen.  Menus, the search entry, the now-playing view and
/// the boot screen all implement this; the trait defaults give every page
/// the global transport behavior and plain back navigation.
pub trait Page {
    fn ctx(&self) -> &Ctx;

    fn header(&self) -> Arc<str>;

    fn has_sub_page(&self) -> bool;

    fn is_title(&self) -> bool {
        false
    }

    fn selectable(&self) -> bool {
        true
    }

    fn value(&self) -> Option<Arc<str>> {
        None
    }

    /// Re-query content that may have changed while the page was not
    /// displayed.  Called by parents before descending into this page.
    fn reload(&mut self) {}

    fn nav_up(&mut self);

    fn nav_down(&mut self);

    /// Selecting must have no render-side effects: deferred commands fire
    /// on the first render of the pushed page, not here.
    fn nav_select(&mut self) -> NavAction;

    fn nav_back(&mut self) -> NavAction {
        NavAction::Pop
    }

    fn nav_play(&mut self) {
        self.ctx().transport(TransportCommand::TogglePlay);
    }

    fn nav_prev(&mut self) {
        self.ctx().transport(TransportCommand::Previous);
    }

    fn nav_next(&mut self) {
        self.ctx().transport(TransportCommand::Next);
    }

    fn render(&mut self) -> Rendering;
}
