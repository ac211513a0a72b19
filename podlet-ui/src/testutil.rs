//! Deterministic fakes for the page and app tests.  Worker effects become
//! observable through `Dispatcher::join`, timer effects through a manually
//! pumped `TimerQueue`.

use std::{
    cell::RefCell,
    rc::Rc,
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use podlet_core::{
    catalog::{Album, Artist, Device, NowPlaying, Playlist, SearchResults, Track},
    client::MusicApi,
    control::{AudioOutputControl, BluetoothControl, VolumeControl},
    dispatch::Dispatcher,
    error::Error,
    library::Library,
};

use crate::{
    app::Screen,
    config::Config,
    ctx::Ctx,
    render::{BootSnapshot, MenuSnapshot, NowPlayingSnapshot, SearchSnapshot},
    timer::{TimerHost, TimerQueue},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiCall {
    PlayPrevious,
    PlayNext,
    TogglePlay,
    PlayTrack(Arc<str>),
    PlayArtist(Arc<str>),
    PlayFromPlaylist(Arc<str>, Arc<str>),
    Search(String),
    RefreshData,
    RefreshDevices,
}

/// Scriptable `MusicApi`: responses are plain fields, every call is
/// recorded, and the boot load can be gated on a channel so tests control
/// when the worker finishes.
pub(crate) struct FakeApi {
    pub now_playing: Mutex<Option<NowPlaying>>,
    pub internet: Mutex<bool>,
    pub search_response: Mutex<Option<SearchResults>>,
    pub boot_response: Mutex<Option<Result<Library, Error>>>,
    boot_gate: Mutex<Option<Receiver<Result<Library, Error>>>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now_playing: Mutex::new(None),
            internet: Mutex::new(true),
            search_response: Mutex::new(None),
            boot_response: Mutex::new(None),
            boot_gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Block `refresh_data`/`refresh_devices` until the returned sender
    /// delivers the result.
    pub fn gate_boot(&self) -> Sender<Result<Library, Error>> {
        let (tx, rx) = bounded(1);
        *self.boot_gate.lock() = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &ApiCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().push(call);
    }

    fn boot_result(&self) -> Result<Library, Error> {
        let gate = self.boot_gate.lock().clone();
        if let Some(gate) = gate {
            return gate
                .recv()
                .unwrap_or_else(|_| Err(Error::ClientError("boot gate closed".into())));
        }
        self.boot_response
            .lock()
            .take()
            .unwrap_or_else(|| Ok(Library::default()))
    }
}

impl MusicApi for FakeApi {
    fn now_playing(&self) -> Option<NowPlaying> {
        self.now_playing.lock().clone()
    }

    fn has_internet(&self) -> bool {
        *self.internet.lock()
    }

    fn search(&self, query: &str) -> Result<SearchResults, Error> {
        self.record(ApiCall::Search(query.to_string()));
        self.search_response
            .lock()
            .clone()
            .ok_or_else(|| Error::ClientError("no search data scripted".into()))
    }

    fn play_previous(&self) {
        self.record(ApiCall::PlayPrevious);
    }

    fn play_next(&self) {
        self.record(ApiCall::PlayNext);
    }

    fn toggle_play(&self) {
        self.record(ApiCall::TogglePlay);
    }

    fn play_track(&self, uri: &str) {
        self.record(ApiCall::PlayTrack(uri.into()));
    }

    fn play_artist(&self, uri: &str) {
        self.record(ApiCall::PlayArtist(uri.into()));
    }

    fn play_from_playlist(&self, context_uri: &str, track_uri: &str) {
        self.record(ApiCall::PlayFromPlaylist(context_uri.into(), track_uri.into()));
    }

    fn refresh_data(&self) -> Result<Library, Error> {
        self.record(ApiCall::RefreshData);
        self.boot_result()
    }

    fn refresh_devices(&self) -> Result<Library, Error> {
        self.record(ApiCall::RefreshDevices);
        self.boot_result()
    }
}

pub(crate) struct FakeVolume {
    pub level: Mutex<u8>,
    pub sets: Mutex<Vec<u8>>,
}

impl FakeVolume {
    pub fn new(level: u8) -> Arc<Self> {
        Arc::new(Self {
            level: Mutex::new(level),
            sets: Mutex::new(Vec::new()),
        })
    }
}

impl VolumeControl for FakeVolume {
    fn volume(&self) -> u8 {
        *self.level.lock()
    }

    fn set_volume(&self, volume: u8) {
        *self.level.lock() = volume;
        self.sets.lock().push(volume);
    }
}

pub(crate) struct FakeBluetooth {
    pub devices: Mutex<Vec<Device>>,
    pub toggles: Mutex<Vec<Arc<str>>>,
}

impl BluetoothControl for FakeBluetooth {
    fn paired_devices(&self) -> Vec<Device> {
        self.devices.lock().clone()
    }

    fn toggle(&self, device: &Device) {
        self.toggles.lock().push(Arc::clone(&device.address));
        for entry in self.devices.lock().iter_mut() {
            if entry.address == device.address {
                entry.connected = !entry.connected;
            }
        }
    }
}

pub(crate) struct FakeAudioOutput {
    pub devices: Mutex<Vec<Device>>,
    pub selections: Mutex<Vec<Arc<str>>>,
}

impl AudioOutputControl for FakeAudioOutput {
    fn output_devices(&self) -> Vec<Device> {
        self.devices.lock().clone()
    }

    fn select(&self, device: &Device) {
        self.selections.lock().push(Arc::clone(&device.address));
        for entry in self.devices.lock().iter_mut() {
            entry.connected = entry.address == device.address;
        }
    }
}

/// Fully faked `Ctx` plus handles on every fake behind it.
pub(crate) struct Harness {
    pub ctx: Ctx,
    pub api: Arc<FakeApi>,
    pub volume: Arc<FakeVolume>,
    pub bluetooth: Arc<FakeBluetooth>,
    pub audio: Arc<FakeAudioOutput>,
    pub timers: Rc<TimerQueue>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let api = FakeApi::new();
        let volume = FakeVolume::new(50);
        let bluetooth = Arc::new(FakeBluetooth {
            devices: Mutex::new(Vec::new()),
            toggles: Mutex::new(Vec::new()),
        });
        let audio = Arc::new(FakeAudioOutput {
            devices: Mutex::new(Vec::new()),
            selections: Mutex::new(Vec::new()),
        });
        let timers = Rc::new(TimerQueue::new());
        let ctx = Ctx::new(
            Arc::clone(&api) as Arc<dyn MusicApi>,
            Arc::clone(&volume) as Arc<dyn VolumeControl>,
            Arc::clone(&bluetooth) as Arc<dyn BluetoothControl>,
            Arc::clone(&audio) as Arc<dyn AudioOutputControl>,
            Dispatcher::new(),
            Rc::clone(&timers) as Rc<dyn TimerHost>,
            Rc::new(config),
        );
        Self {
            ctx,
            api,
            volume,
            bluetooth,
            audio,
            timers,
        }
    }

    pub fn set_library(&self, library: Library) {
        self.ctx.set_library(Arc::new(library));
    }

    /// Wait out every dispatched worker, then fire all pending timers.
    pub fn tick(&self) {
        self.ctx.dispatcher.join();
        self.timers
            .run_due(Instant::now() + Duration::from_secs(60));
    }
}

/// Frame consumer that keeps everything it is shown.
pub(crate) struct RecordingScreen {
    pub menus: RefCell<Vec<MenuSnapshot>>,
    pub now_playing: RefCell<Vec<NowPlayingSnapshot>>,
    pub searches: RefCell<Vec<SearchSnapshot>>,
    pub boots: RefCell<Vec<BootSnapshot>>,
}

impl RecordingScreen {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            menus: RefCell::new(Vec::new()),
            now_playing: RefCell::new(Vec::new()),
            searches: RefCell::new(Vec::new()),
            boots: RefCell::new(Vec::new()),
        })
    }

    pub fn last_menu(&self) -> MenuSnapshot {
        self.menus.borrow().last().cloned().expect("no menu frame shown")
    }
}

impl Screen for RecordingScreen {
    fn show_menu(&self, frame: &MenuSnapshot) {
        self.menus.borrow_mut().push(frame.clone());
    }

    fn show_now_playing(&self, frame: &NowPlayingSnapshot) {
        self.now_playing.borrow_mut().push(frame.clone());
    }

    fn show_search(&self, frame: &SearchSnapshot) {
        self.searches.borrow_mut().push(frame.clone());
    }

    fn show_boot(&self, frame: &BootSnapshot) {
        self.boots.borrow_mut().push(frame.clone());
    }
}

pub(crate) fn track(n: usize) -> Track {
    Track {
        uri: format!("podlet:track:{n}").into(),
        title: format!("Track {n}").into(),
        artists: vec!["Band".into()],
        duration: Duration::from_secs(200),
    }
}

pub(crate) fn artist(n: usize) -> Artist {
    Artist {
        uri: format!("podlet:artist:{n}").into(),
        name: format!("Artist {n}").into(),
    }
}

pub(crate) fn album(n: usize, track_count: usize) -> Album {
    Album {
        uri: format!("podlet:album:{n}").into(),
        name: format!("Album {n}").into(),
        artist: "Band".into(),
        track_count,
    }
}

pub(crate) fn playlist(n: usize, idx: usize, track_count: usize) -> Playlist {
    Playlist {
        uri: format!("podlet:playlist:{n}").into(),
        name: format!("Playlist {n}").into(),
        track_count,
        idx,
    }
}

pub(crate) fn device(name: &str, connected: bool) -> Device {
    Device {
        name: name.into(),
        address: format!("addr:{name}").into(),
        connected,
    }
}

pub(crate) fn playing(title: &str) -> NowPlaying {
    NowPlaying {
        name: title.into(),
        artist: "Band".into(),
        album: "Album".into(),
        context_name: "Context".into(),
        is_playing: true,
        progress: Duration::from_secs(30),
        duration: Duration::from_secs(200),
        track_index: Some(0),
    }
}

/// `tracks`/`artists`/`albums` many results; every album carries two
/// in-memory tracks.
pub(crate) fn search_results(tracks: usize, artists: usize, albums: usize) -> SearchResults {
    let mut results = SearchResults {
        tracks: (0..tracks).map(track).collect(),
        artists: (0..artists).map(artist).collect(),
        albums: (0..albums).map(|n| album(n, 2)).collect(),
        album_tracks: Default::default(),
    };
    for entry in &results.albums {
        results
            .album_tracks
            .insert(Arc::clone(&entry.uri), vec![track(100), track(101)]);
    }
    results
}

pub(crate) fn small_library() -> Library {
    let mut library = Library {
        playlists: vec![playlist(0, 1, 2), playlist(1, 0, 1)],
        albums: vec![album(0, 2)],
        new_releases: vec![album(1, 2)],
        artists: (0..3).map(artist).collect(),
        saved_tracks: vec![track(0), track(1)],
        ..Library::default()
    };
    library
        .tracks_by_context
        .insert("podlet:playlist:0".into(), vec![track(10), track(11)]);
    library
        .tracks_by_context
        .insert("podlet:playlist:1".into(), vec![track(12)]);
    library
        .tracks_by_context
        .insert("podlet:album:0".into(), vec![track(20), track(21)]);
    library
}
