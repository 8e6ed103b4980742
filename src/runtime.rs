use chrono::{DateTime, Local, Utc};

use crate::activity::{get_active_seconds_today, ActivitySource};
use crate::alert::{AlertContent, AlertPresenter};
use crate::decision::{decide, target_seconds, Decision};
use crate::snooze::SnoozeStore;
use crate::util::{format_duration, format_remaining};

/// Inputs for one check, already merged from config file and command line
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub target_minutes: u32,
    pub snooze_options: Vec<u32>,
    pub force: bool,
    pub hostname: String,
}

/// Runs the query -> decide -> alert pipeline once
pub struct Runner<S: ActivitySource, P: AlertPresenter> {
    source: S,
    presenter: P,
    store: SnoozeStore,
    settings: Settings,
}

impl<S: ActivitySource, P: AlertPresenter> Runner<S, P> {
    pub fn new(source: S, presenter: P, store: SnoozeStore, settings: Settings) -> Self {
        Self {
            source,
            presenter,
            store,
            settings,
        }
    }

    pub fn run(&self) -> Decision {
        self.run_at(Local::now())
    }

    /// Never fails: every error along the way has already been logged and
    /// turned into "do not alert".
    pub fn run_at(&self, now: DateTime<Local>) -> Decision {
        let active_secs = get_active_seconds_today(&self.source, &self.settings.hostname, now);
        let worked = format_duration(active_secs);
        println!(
            "Active work time today: {} ({:.0} seconds)",
            worked, active_secs
        );

        let remaining = self.store.remaining_at(now.with_timezone(&Utc));
        let decision = decide(
            active_secs,
            self.settings.target_minutes,
            remaining,
            self.settings.force,
        );

        match decision {
            Decision::Snoozed { remaining_secs } => {
                println!(
                    "Alert is currently snoozed. Remaining time: {}",
                    format_remaining(remaining_secs)
                );
            }
            Decision::BelowTarget => {
                let left = target_seconds(self.settings.target_minutes) - active_secs;
                log::info!(
                    "Below the {} target, {} to go",
                    format_duration(target_seconds(self.settings.target_minutes)),
                    format_duration(left)
                );
            }
            Decision::Alert => {
                let content =
                    AlertContent::work_day_complete(&worked, self.settings.snooze_options.clone());
                if let Err(e) = self.presenter.show_alert(&content, &self.store) {
                    log::error!("Notification error: {}", e);
                }
            }
        }

        decision
    }
}
