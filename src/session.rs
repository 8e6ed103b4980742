use crate::monitors::WindowPlacement;
use crate::snooze::SnoozeStore;

/// How an alert session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Dismissed,
    Snoozed { minutes: u32 },
}

/// All windows of one alert share this single piece of state. The first
/// terminal action wins; once it lands no window is left open.
#[derive(Debug)]
pub struct AlertSession {
    windows: Vec<WindowPlacement>,
    store: SnoozeStore,
    outcome: Option<Outcome>,
}

impl AlertSession {
    pub fn new(windows: Vec<WindowPlacement>, store: SnoozeStore) -> Self {
        Self {
            windows,
            store,
            outcome: None,
        }
    }

    /// Windows that should currently be on screen; empty once the session ended
    pub fn open_windows(&self) -> &[WindowPlacement] {
        if self.is_over() {
            &[]
        } else {
            &self.windows
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn dismiss(&mut self) {
        self.end_session(Outcome::Dismissed);
    }

    /// Persist the snooze, then tear everything down. The session still ends
    /// if the snooze file cannot be written.
    pub fn snooze(&mut self, minutes: u32) {
        if self.is_over() {
            return;
        }
        self.store.set_snooze(minutes);
        self.end_session(Outcome::Snoozed { minutes });
    }

    fn end_session(&mut self, outcome: Outcome) {
        if self.outcome.is_some() {
            return;
        }
        log::info!("Alert session ended: {:?}", outcome);
        self.outcome = Some(outcome);
    }
}
