use std::{cell::RefCell, rc::Rc, sync::Arc};

use podlet_core::{
    client::{MusicApi, TransportCommand},
    control::{AudioOutputControl, BluetoothControl, VolumeControl},
    dispatch::Dispatcher,
    library::Library,
};

use crate::{config::Config, timer::TimerHost};

/// Cheap to clone bundle of the collaborators every page needs: the remote
/// client, the system controls, the worker pool and the timer host.  The
/// loaded library snapshot is published here by the boot page and shared
/// with the whole page tree.
#[derive(Clone)]
pub struct Ctx {
    pub api: Arc<dyn MusicApi>,
    pub volume: Arc<dyn VolumeControl>,
    pub bluetooth: Arc<dyn BluetoothControl>,
    pub audio_output: Arc<dyn AudioOutputControl>,
    pub dispatcher: Dispatcher,
    pub timers: Rc<dyn TimerHost>,
    pub config: Rc<Config>,
    library: Rc<RefCell<Option<Arc<Library>>>>,
}

impl Ctx {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        api: Arc<dyn MusicApi>,
        volume: Arc<dyn VolumeControl>,
        bluetooth: Arc<dyn BluetoothControl>,
        audio_output: Arc<dyn AudioOutputControl>,
        dispatcher: Dispatcher,
        timers: Rc<dyn TimerHost>,
        config: Rc<Config>,
    ) -> Self {
        Self {
            api,
            volume,
            bluetooth,
            audio_output,
            dispatcher,
            timers,
            config,
            library: Rc::new(RefCell::new(None)),
        }
    }

    pub fn library(&self) -> Option<Arc<Library>> {
        self.library.borrow().clone()
    }

    pub fn set_library(&self, library: Arc<Library>) {
        self.library.replace(Some(library));
    }

    /// Forward a transport button to the client on a worker thread.
    pub fn transport(&self, command: TransportCommand) {
        let api = Arc::clone(&self.api);
        self.dispatcher.run_async(move || api.transport(command));
    }
}
