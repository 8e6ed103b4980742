use crate::error::AlertError;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// File-backed "snoozed until" deadline.
///
/// The file holds a single decimal Unix timestamp. Anything else found there,
/// or no file at all, means "not snoozed".
#[derive(Debug, Clone)]
pub struct SnoozeStore {
    path: PathBuf,
}

impl SnoozeStore {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    /// Seconds until the persisted deadline, or 0 when not snoozed.
    pub fn get_remaining_snooze(&self) -> f64 {
        self.remaining_at(Utc::now())
    }

    pub fn remaining_at(&self, now: DateTime<Utc>) -> f64 {
        match self.read_deadline() {
            Some(deadline) => (deadline - epoch_seconds(now)).max(0.0),
            None => 0.0,
        }
    }

    /// Suppress alerts for `minutes` from now, replacing any earlier snooze.
    /// A failed write is logged; the caller carries on either way.
    pub fn set_snooze(&self, minutes: u32) {
        if let Err(e) = self.snooze_at(minutes, Utc::now()) {
            log::error!("Error setting snooze: {}", e);
        }
    }

    pub fn snooze_at(&self, minutes: u32, now: DateTime<Utc>) -> Result<f64, AlertError> {
        let deadline = epoch_seconds(now) + f64::from(minutes) * 60.0;
        self.write_deadline(deadline)?;
        log::info!("Snoozed for {} minutes", minutes);
        Ok(deadline)
    }

    fn read_deadline(&self) -> Option<f64> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Could not read snooze file {}: {}", self.path.display(), e);
                return None;
            }
        };
        match raw.trim().parse::<f64>() {
            Ok(deadline) if deadline.is_finite() => Some(deadline),
            _ => {
                log::warn!(
                    "Ignoring unreadable snooze file {}",
                    self.path.display()
                );
                None
            }
        }
    }

    // Write to a sibling then rename so readers never observe a half-written value.
    fn write_deadline(&self, deadline: f64) -> Result<(), AlertError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension(format!("{}.tmp", std::process::id()));
        fs::write(&tmp, deadline.to_string())?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

fn epoch_seconds(t: DateTime<Utc>) -> f64 {
    t.timestamp_micros() as f64 / 1_000_000.0
}
