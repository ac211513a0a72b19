use std::{cell::Cell, cell::RefCell, rc::Rc, sync::Arc, time::Duration};

use podlet_core::{catalog::NowPlaying, client::TransportCommand};

use crate::{
    command::DeferredPlay,
    ctx::Ctx,
    page::{NavAction, Page, PageHandle},
    render::{NowPlayingSnapshot, Rendering},
    subscription::Subscription,
};

/// Live playback view.  Data refreshes pull the current track from the
/// client and reconcile hardware volume with the target; volume refreshes
/// synthesize a volume banner so the user gets feedback ahead of the next
/// poll.  Every scheduled continuation is a data refresh.
pub struct NowPlayingRendering {
    ctx: Ctx,
    subscription: Subscription<NowPlayingSnapshot>,
    target_volume: Cell<u8>,
}

impl NowPlayingRendering {
    pub fn new(ctx: Ctx) -> Rc<Self> {
        let target_volume = Cell::new(ctx.volume.volume());
        Rc::new(Self {
            ctx,
            subscription: Subscription::new(),
            target_volume,
        })
    }

    pub fn subscribe(self: &Rc<Self>, callback: Rc<dyn Fn(&NowPlayingSnapshot)>) {
        if self.subscription.install(callback) {
            self.refresh(false);
        }
    }

    pub fn unsubscribe(&self) {
        self.subscription.clear(self.ctx.timers.as_ref());
    }

    pub fn refresh_data(self: &Rc<Self>) {
        self.refresh(false);
    }

    pub fn volume_up(self: &Rc<Self>, step: u8) {
        let volume = self.target_volume.get();
        if volume < 100 {
            self.target_volume.set((volume + step).min(100));
            self.refresh(true);
        }
    }

    pub fn volume_down(self: &Rc<Self>, step: u8) {
        let volume = self.target_volume.get();
        if volume > 0 {
            self.target_volume.set(volume.saturating_sub(step));
            self.refresh(true);
        }
    }

    pub fn target_volume(&self) -> u8 {
        self.target_volume.get()
    }

    fn refresh(self: &Rc<Self>, volume_preview: bool) {
        if !self.subscription.is_subscribed() {
            return;
        }
        let target = self.target_volume.get();
        let playing = if volume_preview {
            Some(volume_banner(target))
        } else {
            if self.ctx.volume.volume() != target {
                self.ctx.volume.set_volume(target);
            }
            self.ctx.api.now_playing()
        };
        self.subscription.emit(&NowPlayingSnapshot {
            playing,
            volume: target,
            volume_preview,
        });
        let this = Rc::clone(self);
        self.subscription
            .schedule(self.ctx.timers.as_ref(), move || this.refresh(false));
    }
}

/// Pseudo-track standing in for playback state while the user is turning
/// the volume: the progress bar shows the target level on a 0..100 scale.
fn volume_banner(target: u8) -> NowPlaying {
    NowPlaying {
        name: "".into(),
        artist: "".into(),
        album: "Volume".into(),
        context_name: "".into(),
        is_playing: true,
        progress: Duration::from_secs(u64::from(target)),
        duration: Duration::from_secs(100),
        track_index: None,
    }
}

/// Screen for a single playable thing.  The deferred command starts
/// playback on the first render; the transport buttons act globally and the
/// up/down buttons turn the volume.
pub struct NowPlayingPage {
    ctx: Ctx,
    header: Arc<str>,
    command: DeferredPlay,
    live: Rc<NowPlayingRendering>,
}

impl NowPlayingPage {
    pub fn new(ctx: Ctx, header: impl Into<Arc<str>>, command: DeferredPlay) -> Self {
        let live = NowPlayingRendering::new(ctx.clone());
        Self {
            ctx,
            header: header.into(),
            command,
            live,
        }
    }

    pub fn into_handle(self) -> PageHandle {
        Rc::new(RefCell::new(self))
    }

    #[cfg(test)]
    pub(crate) fn live(&self) -> Rc<NowPlayingRendering> {
        Rc::clone(&self.live)
    }
}

impl Page for NowPlayingPage {
    fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    fn header(&self) -> Arc<str> {
        self.header.clone()
    }

    fn has_sub_page(&self) -> bool {
        false
    }

    fn nav_up(&mut self) {
        self.live.volume_up(self.ctx.config.volume_step);
    }

    fn nav_down(&mut self) {
        self.live.volume_down(self.ctx.config.volume_step);
    }

    fn nav_select(&mut self) -> NavAction {
        NavAction::Stay
    }

    fn nav_play(&mut self) {
        self.ctx.transport(TransportCommand::TogglePlay);
        self.live.refresh_data();
    }

    fn nav_prev(&mut self) {
        self.ctx.transport(TransportCommand::Previous);
        self.live.refresh_data();
    }

    fn nav_next(&mut self) {
        self.ctx.transport(TransportCommand::Next);
        self.live.refresh_data();
    }

    fn render(&mut self) -> Rendering {
        if !self.command.has_run() {
            self.command.run(&self.ctx);
        }
        Rendering::NowPlaying(Rc::clone(&self.live))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::{
        command::PlayAction,
        testutil::{playing, ApiCall, Harness},
    };

    use super::*;

    fn collect(live: &Rc<NowPlayingRendering>) -> Rc<RefCell<Vec<NowPlayingSnapshot>>> {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        live.subscribe(Rc::new(move |frame: &NowPlayingSnapshot| {
            sink.borrow_mut().push(frame.clone())
        }));
        frames
    }

    #[test]
    fn deferred_command_fires_exactly_once_across_renders() {
        let harness = Harness::new();
        let command = DeferredPlay::new(PlayAction::Track {
            uri: "podlet:track:7".into(),
        });
        let mut page = NowPlayingPage::new(harness.ctx.clone(), "Track 7", command);
        for _ in 0..4 {
            page.render();
        }
        harness.ctx.dispatcher.join();
        assert_eq!(
            harness.api.count(&ApiCall::PlayTrack("podlet:track:7".into())),
            1
        );
    }

    #[test]
    fn selecting_never_starts_playback() {
        let harness = Harness::new();
        let command = DeferredPlay::new(PlayAction::Track {
            uri: "podlet:track:7".into(),
        });
        let mut page = NowPlayingPage::new(harness.ctx.clone(), "Track 7", command);
        page.nav_select();
        page.nav_select();
        harness.ctx.dispatcher.join();
        assert!(harness.api.calls().is_empty());
    }

    #[test]
    fn subscribing_pushes_a_data_frame_and_schedules_the_next() {
        let harness = Harness::new();
        *harness.api.now_playing.lock() = Some(playing("Song"));
        let live = NowPlayingRendering::new(harness.ctx.clone());
        let frames = collect(&live);
        {
            let frames = frames.borrow();
            assert_eq!(frames.len(), 1);
            assert!(!frames[0].volume_preview);
            assert_eq!(frames[0].playing.as_ref().map(|p| &*p.name), Some("Song"));
        }
        assert_eq!(harness.timers.pending(), 1);
    }

    #[test]
    fn volume_turn_previews_without_touching_the_client() {
        let harness = Harness::new();
        let live = NowPlayingRendering::new(harness.ctx.clone());
        let frames = collect(&live);
        live.volume_up(5);
        let frames = frames.borrow();
        let last = frames.last().unwrap();
        assert!(last.volume_preview);
        assert_eq!(last.volume, 55);
        let banner = last.playing.as_ref().unwrap();
        assert_eq!(&*banner.album, "Volume");
        assert_eq!(banner.progress, Duration::from_secs(55));
        // Previews never write the hardware volume.
        assert!(harness.volume.sets.lock().is_empty());
    }

    #[test]
    fn next_data_refresh_reconciles_hardware_volume() {
        let harness = Harness::new();
        let live = NowPlayingRendering::new(harness.ctx.clone());
        collect(&live);
        // Subscription refresh found hardware already at target.
        assert!(harness.volume.sets.lock().is_empty());
        live.volume_up(5);
        harness.tick();
        assert_eq!(*harness.volume.sets.lock(), vec![55]);
        // Once reconciled, further ticks leave the hardware alone.
        harness.tick();
        assert_eq!(*harness.volume.sets.lock(), vec![55]);
    }

    #[test]
    fn volume_clamps_at_both_ends() {
        let harness = Harness::new();
        let live = NowPlayingRendering::new(harness.ctx.clone());
        collect(&live);
        for _ in 0..30 {
            live.volume_up(5);
        }
        assert_eq!(live.target_volume(), 100);
        for _ in 0..30 {
            live.volume_down(5);
        }
        assert_eq!(live.target_volume(), 0);
    }

    #[test]
    fn unsubscribe_stops_frames_and_timers() {
        let harness = Harness::new();
        let live = NowPlayingRendering::new(harness.ctx.clone());
        let frames = collect(&live);
        live.unsubscribe();
        assert_eq!(harness.timers.pending(), 0);
        harness.tick();
        harness.tick();
        assert_eq!(frames.borrow().len(), 1);
    }

    #[test]
    fn resubscribing_the_same_callback_is_a_no_op() {
        let harness = Harness::new();
        let live = NowPlayingRendering::new(harness.ctx.clone());
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        let callback: Rc<dyn Fn(&NowPlayingSnapshot)> =
            Rc::new(move |frame| sink.borrow_mut().push(frame.clone()));
        live.subscribe(Rc::clone(&callback));
        live.subscribe(callback);
        assert_eq!(frames.borrow().len(), 1);
        assert_eq!(harness.timers.pending(), 1);
    }

    #[test]
    fn transport_buttons_reach_the_client() {
        let harness = Harness::new();
        let mut page =
            NowPlayingPage::new(harness.ctx.clone(), "Now Playing", DeferredPlay::none());
        page.nav_prev();
        page.nav_next();
        page.nav_play();
        harness.ctx.dispatcher.join();
        assert_eq!(
            harness.api.calls(),
            vec![ApiCall::PlayPrevious, ApiCall::PlayNext, ApiCall::TogglePlay]
        );
    }
}
