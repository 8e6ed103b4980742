use crate::app_dirs::AppDirs;
use crate::util::DEFAULT_SNOOZE_OPTIONS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGET_MINUTES: u32 = 480;

/// Persistent defaults; every field can still be overridden on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub target_minutes: u32,
    pub snooze_options: Vec<u32>,
    /// Full base URL of the ActivityWatch server, e.g. `http://127.0.0.1:5600`
    pub server_url: Option<String>,
    /// Hostname used to build the AFK bucket id; the system hostname when unset
    pub hostname: Option<String>,
    pub snooze_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_minutes: DEFAULT_TARGET_MINUTES,
            snooze_options: DEFAULT_SNOOZE_OPTIONS.to_vec(),
            server_url: None,
            hostname: None,
            snooze_file: None,
        }
    }
}

impl Config {
    pub fn snooze_path(&self) -> PathBuf {
        self.snooze_file.clone().unwrap_or_else(AppDirs::snooze_path)
    }

    /// Snooze options from the file, with zero entries removed and the
    /// built-in list substituted when nothing usable remains.
    pub fn snooze_options(&self) -> Vec<u32> {
        let options: Vec<u32> = self
            .snooze_options
            .iter()
            .copied()
            .filter(|m| *m > 0)
            .collect();
        if options.is_empty() {
            DEFAULT_SNOOZE_OPTIONS.to_vec()
        } else {
            options
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!(
                    "Ignoring malformed config {}: {}",
                    self.path.display(),
                    e
                );
                Config::default()
            }
        }
    }
}
