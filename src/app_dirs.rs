use directories::ProjectDirs;
use std::path::PathBuf;

pub const APP_NAME: &str = "work-end-alert";
const SNOOZE_FILE_NAME: &str = "work_end_alert_snooze.txt";

/// Centralized application path resolution
pub struct AppDirs;

impl AppDirs {
    /// Snooze deadlines live in the system temp dir so they are cleared by reboots
    pub fn snooze_path() -> PathBuf {
        std::env::temp_dir().join(SNOOZE_FILE_NAME)
    }

    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            proj_dirs.config_dir().join("config.json")
        } else {
            PathBuf::from("work_end_alert_config.json")
        }
    }
}
