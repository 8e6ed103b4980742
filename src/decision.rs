/// What a single run should do after looking at today's numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// A snooze is still running; report what's left and stay quiet
    Snoozed { remaining_secs: f64 },
    BelowTarget,
    Alert,
}

impl Decision {
    pub fn should_alert(&self) -> bool {
        matches!(self, Decision::Alert)
    }
}

/// `force` overrides a running snooze but never the target itself. The
/// threshold is inclusive.
pub fn decide(active_secs: f64, target_minutes: u32, remaining_snooze: f64, force: bool) -> Decision {
    if !force && remaining_snooze > 0.0 {
        return Decision::Snoozed {
            remaining_secs: remaining_snooze,
        };
    }

    if active_secs >= target_seconds(target_minutes) {
        Decision::Alert
    } else {
        Decision::BelowTarget
    }
}

pub fn target_seconds(target_minutes: u32) -> f64 {
    f64::from(target_minutes) * 60.0
}
