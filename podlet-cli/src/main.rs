use std::{
    collections::HashMap,
    io,
    io::BufRead,
    rc::Rc,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use env_logger::{Builder, Env};
use parking_lot::Mutex;
use podlet_core::{
    catalog::{Album, Artist, Device, NowPlaying, Playlist, SearchResults, Track},
    client::MusicApi,
    control::{AudioOutputControl, BluetoothControl, VolumeControl},
    dispatch::Dispatcher,
    error::Error,
    library::Library,
};
use podlet_ui::{
    app::{App, Input, Screen},
    config::Config,
    ctx::Ctx,
    render::{BootSnapshot, LineKind, MenuSnapshot, NowPlayingSnapshot, SearchSnapshot},
    timer::{TimerHost, TimerQueue},
};

const ENV_LOG: &str = "PODLET_LOG";
const ENV_LOG_STYLE: &str = "PODLET_LOG_STYLE";

/// Artificial latency on the demo client, so the loading screens show.
const BOOT_LATENCY: Duration = Duration::from_millis(600);
const SEARCH_LATENCY: Duration = Duration::from_millis(400);

fn main() {
    // Setup logging from the env variables, with defaults.
    Builder::from_env(
        Env::new()
            .filter_or(ENV_LOG, "info")
            .write_style(ENV_LOG_STYLE),
    )
    .init();

    let config = Config::load().unwrap_or_default();
    let timers = Rc::new(TimerQueue::new());
    let ctx = Ctx::new(
        Arc::new(DemoApi::new()),
        Arc::new(DemoVolume::new()),
        Arc::new(DemoBluetooth::new()),
        Arc::new(DemoAudioOutput::new()),
        Dispatcher::new(),
        Rc::clone(&timers) as Rc<dyn TimerHost>,
        Rc::new(config),
    );

    let mut app = App::new(ctx, Rc::new(TerminalScreen));
    print_help();
    app.start();

    let keys = spawn_stdin_reader();
    loop {
        timers.run_due(Instant::now());
        app.pump();
        let timeout = timers
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_secs(60));
        match keys.recv_timeout(timeout) {
            Ok(key) => match key.as_str() {
                "" => {}
                "q" => break,
                key => match parse_input(key) {
                    Some(input) => app.handle_input(input),
                    None => log::warn!("unknown command {key:?}"),
                },
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn print_help() {
    println!("keys: u=up d=down s=select b=back p=play/pause <=prev >=next q=quit");
}

fn parse_input(key: &str) -> Option<Input> {
    match key {
        "u" => Some(Input::Up),
        "d" => Some(Input::Down),
        "s" => Some(Input::Select),
        "b" => Some(Input::Back),
        "p" => Some(Input::Play),
        "<" => Some(Input::Prev),
        ">" => Some(Input::Next),
        _ => None,
    }
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line.trim().to_string()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Frame consumer that redraws the screen as plain stdout lines.
struct TerminalScreen;

impl Screen for TerminalScreen {
    fn show_menu(&self, frame: &MenuSnapshot) {
        println!("== {} ==", frame.header);
        for line in &frame.lines {
            let cursor = if line.kind == LineKind::Highlighted {
                '>'
            } else {
                ' '
            };
            let text = match (&line.value, line.kind) {
                (Some(value), _) => format!("{}: {}", line.title, value),
                (None, LineKind::Title) => format!("[{}]", line.title),
                (None, _) => line.title.to_string(),
            };
            let arrow = if line.show_arrow { " >" } else { "" };
            println!(" {cursor} {text}{arrow}");
        }
        if let Some(playing) = &frame.now_playing {
            println!("   now: {} - {}", playing.name, playing.artist);
        }
    }

    fn show_now_playing(&self, frame: &NowPlayingSnapshot) {
        match &frame.playing {
            Some(playing) => {
                let state = if playing.is_playing { "playing" } else { "paused" };
                let preview = if frame.volume_preview {
                    " (adjusting)"
                } else {
                    ""
                };
                println!(
                    "[{state}] {} - {} ({} of {}) vol {}%{preview}",
                    playing.name,
                    playing.artist,
                    mmss(playing.progress),
                    mmss(playing.duration),
                    frame.volume,
                );
            }
            None => println!("[idle] vol {}%", frame.volume),
        }
    }

    fn show_search(&self, frame: &SearchSnapshot) {
        let status = if frame.loading { " searching..." } else { "" };
        println!("search> {}[{}]{status}", frame.query, frame.active_char);
        if let Some(results) = &frame.results {
            println!(
                "   {} tracks, {} artists, {} albums",
                results.tracks.len(),
                results.artists.len(),
                results.albums.len(),
            );
        }
    }

    fn show_boot(&self, frame: &BootSnapshot) {
        match frame {
            BootSnapshot::Loading => println!("loading catalog..."),
            BootSnapshot::Loaded => println!("catalog loaded"),
            BootSnapshot::Failed(reason) => println!("boot failed: {reason}"),
        }
    }
}

fn mmss(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

struct PlayerState {
    context_name: Arc<str>,
    queue: Vec<Track>,
    position: usize,
    playing: bool,
    resumed_at: Instant,
    progress: Duration,
}

/// In-memory client over a canned catalog.  Playback is simulated: progress
/// advances with the wall clock while `playing` is set.
struct DemoApi {
    library: Library,
    player: Mutex<Option<PlayerState>>,
}

impl DemoApi {
    fn new() -> Self {
        Self {
            library: demo_library(),
            player: Mutex::new(None),
        }
    }

    fn start_queue(&self, context_name: Arc<str>, queue: Vec<Track>, position: usize) {
        if queue.is_empty() {
            return;
        }
        log::info!("playing {context_name:?}, {} tracks", queue.len());
        *self.player.lock() = Some(PlayerState {
            context_name,
            queue,
            position,
            playing: true,
            resumed_at: Instant::now(),
            progress: Duration::ZERO,
        });
    }

    fn find_track(&self, uri: &str) -> Option<Track> {
        self.library
            .saved_tracks
            .iter()
            .chain(self.library.tracks_by_context.values().flatten())
            .find(|track| &*track.uri == uri)
            .cloned()
    }

    fn context_name(&self, uri: &str) -> Arc<str> {
        for playlist in &self.library.playlists {
            if &*playlist.uri == uri {
                return Arc::clone(&playlist.name);
            }
        }
        for album in self.library.albums.iter().chain(&self.library.new_releases) {
            if &*album.uri == uri {
                return Arc::clone(&album.name);
            }
        }
        "Playback".into()
    }
}

impl MusicApi for DemoApi {
    fn now_playing(&self) -> Option<NowPlaying> {
        let player = self.player.lock();
        let state = player.as_ref()?;
        let track = state.queue.get(state.position)?;
        let mut progress = state.progress;
        if state.playing {
            progress += state.resumed_at.elapsed();
        }
        Some(NowPlaying {
            name: Arc::clone(&track.title),
            artist: track.artist_name(),
            album: Arc::clone(&state.context_name),
            context_name: Arc::clone(&state.context_name),
            is_playing: state.playing,
            progress: progress.min(track.duration),
            duration: track.duration,
            track_index: Some(state.position),
        })
    }

    fn has_internet(&self) -> bool {
        true
    }

    fn search(&self, query: &str) -> Result<SearchResults, Error> {
        thread::sleep(SEARCH_LATENCY);
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(SearchResults::default());
        }
        let matches = |name: &str| name.to_lowercase().contains(&needle);
        let tracks: Vec<Track> = self
            .library
            .saved_tracks
            .iter()
            .filter(|track| matches(&track.title))
            .cloned()
            .collect();
        let artists: Vec<Artist> = self
            .library
            .artists
            .iter()
            .filter(|artist| matches(&artist.name))
            .cloned()
            .collect();
        let albums: Vec<Album> = self
            .library
            .albums
            .iter()
            .chain(&self.library.new_releases)
            .filter(|album| matches(&album.name))
            .cloned()
            .collect();
        let mut album_tracks = HashMap::new();
        for album in &albums {
            if let Some(found) = self.library.context_tracks(&album.uri) {
                album_tracks.insert(Arc::clone(&album.uri), found.to_vec());
            }
        }
        Ok(SearchResults {
            tracks,
            artists,
            albums,
            album_tracks,
        })
    }

    fn play_previous(&self) {
        let mut player = self.player.lock();
        let Some(state) = player.as_mut() else { return };
        state.position = state.position.saturating_sub(1);
        state.progress = Duration::ZERO;
        state.resumed_at = Instant::now();
        state.playing = true;
    }

    fn play_next(&self) {
        let mut player = self.player.lock();
        let Some(state) = player.as_mut() else { return };
        if state.position + 1 < state.queue.len() {
            state.position += 1;
        }
        state.progress = Duration::ZERO;
        state.resumed_at = Instant::now();
        state.playing = true;
    }

    fn toggle_play(&self) {
        let mut player = self.player.lock();
        let Some(state) = player.as_mut() else { return };
        if state.playing {
            state.progress += state.resumed_at.elapsed();
            state.playing = false;
        } else {
            state.resumed_at = Instant::now();
            state.playing = true;
        }
    }

    fn play_track(&self, uri: &str) {
        if let Some(track) = self.find_track(uri) {
            self.start_queue("Saved Tracks".into(), vec![track], 0);
        }
    }

    fn play_artist(&self, uri: &str) {
        let Some(artist) = self.library.artists.iter().find(|a| &*a.uri == uri) else {
            return;
        };
        let queue: Vec<Track> = self
            .library
            .tracks_by_context
            .values()
            .flatten()
            .chain(&self.library.saved_tracks)
            .filter(|track| track.artists.iter().any(|name| *name == artist.name))
            .cloned()
            .collect();
        self.start_queue(Arc::clone(&artist.name), queue, 0);
    }

    fn play_from_playlist(&self, context_uri: &str, track_uri: &str) {
        let Some(tracks) = self.library.context_tracks(context_uri) else {
            return;
        };
        let position = tracks
            .iter()
            .position(|track| &*track.uri == track_uri)
            .unwrap_or(0);
        self.start_queue(self.context_name(context_uri), tracks.to_vec(), position);
    }

    fn refresh_data(&self) -> Result<Library, Error> {
        thread::sleep(BOOT_LATENCY);
        Ok(self.library.clone())
    }

    fn refresh_devices(&self) -> Result<Library, Error> {
        Ok(Library::default())
    }
}

struct DemoVolume {
    level: Mutex<u8>,
}

impl DemoVolume {
    fn new() -> Self {
        Self {
            level: Mutex::new(60),
        }
    }
}

impl VolumeControl for DemoVolume {
    fn volume(&self) -> u8 {
        *self.level.lock()
    }

    fn set_volume(&self, volume: u8) {
        *self.level.lock() = volume;
        log::info!("hardware volume set to {volume}%");
    }
}

struct DemoBluetooth {
    devices: Mutex<Vec<Device>>,
}

impl DemoBluetooth {
    fn new() -> Self {
        Self {
            devices: Mutex::new(vec![
                device("Kitchen Speaker", "F4:73:35:8A:10:24", true),
                device("Car Stereo", "00:1B:10:5C:A1:77", false),
            ]),
        }
    }
}

impl BluetoothControl for DemoBluetooth {
    fn paired_devices(&self) -> Vec<Device> {
        self.devices.lock().clone()
    }

    fn toggle(&self, target: &Device) {
        log::info!("toggling bluetooth device {}", target.name);
        for entry in self.devices.lock().iter_mut() {
            if entry.address == target.address {
                entry.connected = !entry.connected;
            }
        }
    }
}

struct DemoAudioOutput {
    devices: Mutex<Vec<Device>>,
}

impl DemoAudioOutput {
    fn new() -> Self {
        Self {
            devices: Mutex::new(vec![
                device("Headphone Jack", "hw:0", true),
                device("HDMI", "hw:1", false),
            ]),
        }
    }
}

impl AudioOutputControl for DemoAudioOutput {
    fn output_devices(&self) -> Vec<Device> {
        self.devices.lock().clone()
    }

    fn select(&self, target: &Device) {
        log::info!("selecting audio output {}", target.name);
        for entry in self.devices.lock().iter_mut() {
            entry.connected = entry.address == target.address;
        }
    }
}

fn device(name: &str, address: &str, connected: bool) -> Device {
    Device {
        name: name.into(),
        address: address.into(),
        connected,
    }
}

fn track(id: &str, title: &str, artist: &str, secs: u64) -> Track {
    Track {
        uri: format!("podlet:track:{id}").into(),
        title: title.into(),
        artists: vec![artist.into()],
        duration: Duration::from_secs(secs),
    }
}

fn demo_library() -> Library {
    let mut library = Library {
        playlists: vec![
            Playlist {
                uri: "podlet:playlist:morning".into(),
                name: "Morning Drive".into(),
                track_count: 3,
                idx: 0,
            },
            Playlist {
                uri: "podlet:playlist:focus".into(),
                name: "Focus 🎧 Deep".into(),
                track_count: 2,
                idx: 1,
            },
        ],
        albums: vec![Album {
            uri: "podlet:album:parallel".into(),
            name: "Parallel Lines".into(),
            artist: "Night Terrace".into(),
            track_count: 2,
        }],
        new_releases: vec![Album {
            uri: "podlet:album:frost".into(),
            name: "First Frost".into(),
            artist: "Paper Saints".into(),
            track_count: 2,
        }],
        artists: vec![
            Artist {
                uri: "podlet:artist:night-terrace".into(),
                name: "Night Terrace".into(),
            },
            Artist {
                uri: "podlet:artist:paper-saints".into(),
                name: "Paper Saints".into(),
            },
            Artist {
                uri: "podlet:artist:low-orbit".into(),
                name: "Low Orbit".into(),
            },
        ],
        saved_tracks: vec![
            track("neon", "Neon Rain", "Night Terrace", 214),
            track("tides", "Tides", "Low Orbit", 187),
            track("embers", "Embers", "Paper Saints", 243),
        ],
        ..Library::default()
    };
    library.tracks_by_context.insert(
        "podlet:playlist:morning".into(),
        vec![
            track("neon", "Neon Rain", "Night Terrace", 214),
            track("arcade", "Arcade Sun", "Low Orbit", 199),
            track("tides", "Tides", "Low Orbit", 187),
        ],
    );
    library.tracks_by_context.insert(
        "podlet:playlist:focus".into(),
        vec![
            track("stillwater", "Stillwater", "Low Orbit", 264),
            track("glasswork", "Glasswork", "Paper Saints", 230),
        ],
    );
    library.tracks_by_context.insert(
        "podlet:album:parallel".into(),
        vec![
            track("parallel-1", "Signal Fade", "Night Terrace", 205),
            track("parallel-2", "Parallel Lines", "Night Terrace", 252),
        ],
    );
    library.tracks_by_context.insert(
        "podlet:album:frost".into(),
        vec![
            track("frost-1", "First Frost", "Paper Saints", 221),
            track("frost-2", "Thaw", "Paper Saints", 189),
        ],
    );
    library
}
