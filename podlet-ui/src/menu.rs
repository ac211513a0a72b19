use std::{cell::RefCell, num::NonZeroUsize, rc::Rc, sync::Arc};

use lru::LruCache;

use crate::{
    ctx::Ctx,
    page::{NavAction, Page, PageHandle},
    render::{LineItem, LineKind, MenuSnapshot, Rendering},
};

/// Number of rows visible at once.
pub const MENU_PAGE_SIZE: usize = 5;

/// Cursor and window state of a windowed list.  `index` is the highlighted
/// row, `page_start` the first visible one; the window always contains the
/// cursor and every move clamps instead of wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuState {
    pub index: usize,
    pub page_start: usize,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(index: usize) -> Self {
        Self {
            index,
            page_start: 0,
        }
    }

    /// Move the cursor towards the end of the list, scrolling the window
    /// when the cursor would leave it.  `jump` is 2 when the next row is a
    /// section header to be skipped.
    pub fn nav_up(&mut self, total: usize, jump: usize) {
        if self.index + jump >= total {
            return;
        }
        if self.index + jump >= self.page_start + MENU_PAGE_SIZE {
            self.page_start += jump;
        }
        self.index += jump;
    }

    /// Move the cursor towards the start of the list.  A window that would
    /// land one row short of the top is snapped to it.
    pub fn nav_down(&mut self, jump: usize) {
        if self.index < jump {
            return;
        }
        if self.index < self.page_start + jump {
            self.page_start = self.page_start.saturating_sub(jump);
            if self.page_start == 1 {
                self.page_start = 0;
            }
        }
        self.index -= jump;
    }
}

/// Content behind a windowed menu: the row count, the child page for each
/// row, and the navigation particulars that differ between screens.
pub trait RowSource {
    fn title(&self) -> Arc<str>;

    fn total(&mut self, ctx: &Ctx) -> usize;

    /// Child page for row `index`, or None past the end of the list.
    fn row(&mut self, ctx: &Ctx, index: usize) -> Option<PageHandle>;

    fn jump_up(&self, index: usize) -> usize {
        let _ = index;
        1
    }

    fn jump_down(&self, index: usize) -> usize {
        let _ = index;
        1
    }

    /// Selection behavior.  None means the default: descend into the row's
    /// child page.
    fn select(&mut self, ctx: &Ctx, index: usize) -> Option<NavAction> {
        let _ = (ctx, index);
        None
    }

    fn reload(&mut self, ctx: &Ctx) {
        let _ = ctx;
    }

    fn initial_index(&self) -> usize {
        0
    }
}

/// Windowed menu over a `RowSource`.  All list screens are this single type
/// with a different source plugged in.
pub struct MenuPage<S> {
    ctx: Ctx,
    state: MenuState,
    source: S,
}

impl<S: RowSource + 'static> MenuPage<S> {
    pub fn new(ctx: Ctx, source: S) -> Self {
        let state = MenuState::with_index(source.initial_index());
        Self { ctx, state, source }
    }

    pub fn into_handle(self) -> PageHandle {
        Rc::new(RefCell::new(self))
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> MenuState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: RowSource + 'static> Page for MenuPage<S> {
    fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    fn header(&self) -> Arc<str> {
        self.source.title()
    }

    fn has_sub_page(&self) -> bool {
        true
    }

    fn reload(&mut self) {
        self.source.reload(&self.ctx);
    }

    fn nav_up(&mut self) {
        let total = self.source.total(&self.ctx);
        let jump = self.source.jump_up(self.state.index);
        self.state.nav_up(total, jump);
    }

    fn nav_down(&mut self) {
        let jump = self.source.jump_down(self.state.index);
        self.state.nav_down(jump);
    }

    fn nav_select(&mut self) -> NavAction {
        let index = self.state.index;
        if let Some(action) = self.source.select(&self.ctx, index) {
            return action;
        }
        match self.source.row(&self.ctx, index) {
            Some(child) if child.borrow().selectable() => NavAction::Push(child),
            _ => NavAction::Stay,
        }
    }

    fn render(&mut self) -> Rendering {
        let total = self.source.total(&self.ctx);
        let mut lines = Vec::with_capacity(MENU_PAGE_SIZE);
        for i in self.state.page_start..self.state.page_start + MENU_PAGE_SIZE {
            if i >= total {
                lines.push(LineItem::empty());
                continue;
            }
            match self.source.row(&self.ctx, i) {
                Some(child) => {
                    let child = child.borrow();
                    let kind = if child.is_title() {
                        LineKind::Title
                    } else if i == self.state.index {
                        LineKind::Highlighted
                    } else {
                        LineKind::Normal
                    };
                    lines.push(LineItem {
                        title: child.header(),
                        kind,
                        show_arrow: child.has_sub_page(),
                        selectable: child.selectable(),
                        value: child.value(),
                    });
                }
                None => lines.push(LineItem::empty()),
            }
        }
        Rendering::Menu(MenuSnapshot {
            header: self.source.title(),
            lines,
            cursor_index: self.state.index,
            total_count: total,
            now_playing: self.ctx.api.now_playing(),
            has_internet: self.ctx.api.has_internet(),
        })
    }
}

/// Bounded memo of materialized child pages, keyed by row index.  Least
/// recently used children are evicted so large collections never pin
/// thousands of pages.
pub struct PageCache {
    pages: LruCache<usize, PageHandle>,
}

impl PageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            pages: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    pub fn get_or_insert(
        &mut self,
        index: usize,
        build: impl FnOnce() -> Option<PageHandle>,
    ) -> Option<PageHandle> {
        if let Some(page) = self.pages.get(&index) {
            return Some(Rc::clone(page));
        }
        let page = build()?;
        self.pages.put(index, Rc::clone(&page));
        Some(page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Inert leaf page used for device rows, section headers and informational
/// lines.
pub struct PlaceholderPage {
    ctx: Ctx,
    header: Arc<str>,
    has_sub_page: bool,
    is_title: bool,
    selectable: bool,
    value: Option<Arc<str>>,
}

impl PlaceholderPage {
    pub fn new(ctx: Ctx, header: impl Into<Arc<str>>, has_sub_page: bool) -> Self {
        Self {
            ctx,
            header: header.into(),
            has_sub_page,
            is_title: false,
            selectable: true,
            value: None,
        }
    }

    /// Unselectable section header row.
    pub fn section(ctx: Ctx, header: impl Into<Arc<str>>) -> Self {
        Self {
            ctx,
            header: header.into(),
            has_sub_page: false,
            is_title: true,
            selectable: false,
            value: None,
        }
    }

    pub fn into_handle(self) -> PageHandle {
        Rc::new(RefCell::new(self))
    }
}

impl Page for PlaceholderPage {
    fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    fn header(&self) -> Arc<str> {
        self.header.clone()
    }

    fn has_sub_page(&self) -> bool {
        self.has_sub_page
    }

    fn is_title(&self) -> bool {
        self.is_title
    }

    fn selectable(&self) -> bool {
        self.selectable
    }

    fn value(&self) -> Option<Arc<str>> {
        self.value.clone()
    }

    fn nav_up(&mut self) {}

    fn nav_down(&mut self) {}

    fn nav_select(&mut self) -> NavAction {
        NavAction::Stay
    }

    fn render(&mut self) -> Rendering {
        let lines = (0..MENU_PAGE_SIZE).map(|_| LineItem::empty()).collect();
        Rendering::Menu(MenuSnapshot {
            header: self.header.clone(),
            lines,
            cursor_index: 0,
            total_count: 0,
            now_playing: self.ctx.api.now_playing(),
            has_internet: self.ctx.api.has_internet(),
        })
    }
}
