use std::{rc::Rc, sync::Arc};

use crate::{
    command::DeferredPlay,
    ctx::Ctx,
    menu::{MenuPage, RowSource},
    page::PageHandle,
    pages::{
        library::{ArtistsSource, ContextListSource, SavedTracksSource},
        now_playing::NowPlayingPage,
        search::SearchPage,
        settings::SettingsSource,
    },
};

/// Top level menu.  Children are materialized once and keep their state
/// across visits; the trailing now-playing entry appears only while the
/// client reports a current track.
pub struct RootSource {
    pages: Vec<PageHandle>,
}

impl RootSource {
    pub fn new(ctx: &Ctx) -> Self {
        let pages = vec![
            MenuPage::new(ctx.clone(), ArtistsSource::new(ctx)).into_handle(),
            MenuPage::new(ctx.clone(), ContextListSource::albums(ctx)).into_handle(),
            MenuPage::new(ctx.clone(), ContextListSource::new_releases(ctx)).into_handle(),
            MenuPage::new(ctx.clone(), ContextListSource::playlists(ctx)).into_handle(),
            MenuPage::new(ctx.clone(), SavedTracksSource).into_handle(),
            SearchPage::new(ctx.clone()).into_handle(),
            MenuPage::new(ctx.clone(), SettingsSource::new(ctx)).into_handle(),
            NowPlayingPage::new(ctx.clone(), "Now Playing", DeferredPlay::none()).into_handle(),
        ];
        Self { pages }
    }
}

impl RowSource for RootSource {
    fn title(&self) -> Arc<str> {
        "Podlet".into()
    }

    fn total(&mut self, ctx: &Ctx) -> usize {
        if ctx.api.now_playing().is_some() {
            self.pages.len()
        } else {
            self.pages.len() - 1
        }
    }

    fn row(&mut self, _ctx: &Ctx, index: usize) -> Option<PageHandle> {
        self.pages.get(index).map(Rc::clone)
    }
}

/// The menu mounted once boot completes.
pub fn root_page(ctx: &Ctx) -> PageHandle {
    MenuPage::new(ctx.clone(), RootSource::new(ctx)).into_handle()
}

#[cfg(test)]
mod tests {
    use crate::{
        page::{NavAction, Page},
        render::{LineKind, MenuSnapshot, Rendering},
        testutil::{playing, small_library, Harness},
    };

    use super::*;

    fn frame(page: &mut dyn Page) -> MenuSnapshot {
        match page.render() {
            Rendering::Menu(frame) => frame,
            _ => panic!("the root renders as a menu"),
        }
    }

    #[test]
    fn now_playing_entry_is_hidden_while_idle() {
        let harness = Harness::new();
        let mut source = RootSource::new(&harness.ctx);
        assert_eq!(source.total(&harness.ctx), 7);
        *harness.api.now_playing.lock() = Some(playing("Current"));
        assert_eq!(source.total(&harness.ctx), 8);
    }

    #[test]
    fn entries_keep_the_expected_order() {
        let harness = Harness::new();
        harness.set_library(small_library());
        let mut source = RootSource::new(&harness.ctx);
        let headers: Vec<Arc<str>> = (0..8)
            .map(|i| source.row(&harness.ctx, i).unwrap().borrow().header())
            .collect();
        let expected = [
            "Artists",
            "Albums",
            "New Releases",
            "Playlists",
            "Saved Tracks",
            "Search",
            "Settings",
            "Now Playing",
        ];
        for (header, expected) in headers.iter().zip(expected) {
            assert_eq!(&**header, expected);
        }
    }

    #[test]
    fn render_highlights_exactly_the_cursor_row() {
        let harness = Harness::new();
        harness.set_library(small_library());
        let mut page = MenuPage::new(harness.ctx.clone(), RootSource::new(&harness.ctx));
        page.nav_up();
        page.nav_up();
        let frame = frame(&mut page);
        assert_eq!(&*frame.header, "Podlet");
        assert_eq!(frame.cursor_index, 2);
        assert_eq!(frame.total_count, 7);
        let highlighted: Vec<usize> = frame
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.kind == LineKind::Highlighted)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(highlighted, [2]);
    }

    #[test]
    fn cursor_cannot_reach_the_hidden_entry() {
        let harness = Harness::new();
        let mut page = MenuPage::new(harness.ctx.clone(), RootSource::new(&harness.ctx));
        for _ in 0..20 {
            page.nav_up();
        }
        assert_eq!(page.state().index, 6);
        *harness.api.now_playing.lock() = Some(playing("Current"));
        page.nav_up();
        assert_eq!(page.state().index, 7);
    }

    #[test]
    fn children_keep_their_identity_across_visits() {
        let harness = Harness::new();
        let mut page = MenuPage::new(harness.ctx.clone(), RootSource::new(&harness.ctx));
        let first = match page.nav_select() {
            NavAction::Push(child) => child,
            _ => panic!("selecting a root row descends"),
        };
        let second = match page.nav_select() {
            NavAction::Push(child) => child,
            _ => panic!("selecting a root row descends"),
        };
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn root_page_mounts_the_top_menu() {
        let harness = Harness::new();
        let page = root_page(&harness.ctx);
        assert_eq!(&*page.borrow().header(), "Podlet");
        assert!(page.borrow().has_sub_page());
    }
}
