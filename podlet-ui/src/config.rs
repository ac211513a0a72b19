use std::{fs, fs::File, path::PathBuf};

use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "Podlet";
const CONFIG_FILENAME: &str = "config.json";

/// Device configuration, persisted as JSON in the platform config dir.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Boot from the device list instead of the full catalog.  Used on
    /// development units without catalog access.
    pub test_mode: bool,
    /// Volume change per click on the now-playing screen, in percent.
    pub volume_step: u8,
    /// Capacity of the per-menu child page cache.
    pub page_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            test_mode: false,
            volume_step: 5,
            page_cache_size: 15,
        }
    }
}

impl Config {
    fn app_dirs() -> Option<AppDirs> {
        const USE_XDG_ON_MACOS: bool = false;

        AppDirs::new(Some(APP_NAME), USE_XDG_ON_MACOS)
    }

    pub fn config_dir() -> Option<PathBuf> {
        Self::app_dirs().map(|dirs| dirs.config_dir)
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILENAME))
    }

    pub fn load() -> Option<Config> {
        let path = Self::config_path().expect("Failed to get config path");
        if let Ok(file) = File::open(&path) {
            log::info!("loading config: {:?}", &path);
            Some(serde_json::from_reader(file).expect("Failed to read config"))
        } else {
            None
        }
    }

    pub fn save(&self) {
        let dir = Self::config_dir().expect("Failed to get config dir");
        let path = Self::config_path().expect("Failed to get config path");
        fs::create_dir_all(dir).expect("Failed to create config dir");
        let file = File::create(path).expect("Failed to create config");
        serde_json::to_writer_pretty(file, self).expect("Failed to write config");
    }
}
