use crate::error::AlertError;

pub const DEFAULT_SNOOZE_OPTIONS: [u32; 3] = [15, 30, 60];

/// Hours and minutes, seconds truncated: `3661.0` -> `"1h 1m"`.
pub fn format_duration(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;

    format!("{}h {}m", hours, minutes)
}

/// Minutes and seconds, used when reporting what is left of a snooze.
pub fn format_remaining(seconds: f64) -> String {
    let total = whole_seconds(seconds);

    format!("{}m {}s", total / 60, total % 60)
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    }
}

/// Parse a comma separated list of positive minute values, e.g. `"15, 30,60"`.
pub fn parse_snooze_options(input: &str) -> Result<Vec<u32>, AlertError> {
    let invalid = |reason: String| AlertError::InvalidSnoozeOptions {
        input: input.to_string(),
        reason,
    };

    input
        .split(',')
        .map(|part| {
            let part = part.trim();
            match part.parse::<u32>() {
                Ok(0) => Err(invalid("snooze minutes must be positive".to_string())),
                Ok(minutes) => Ok(minutes),
                Err(e) => Err(invalid(format!("'{}': {}", part, e))),
            }
        })
        .collect()
}

/// Like [`parse_snooze_options`] but never fails: a bad list is reported
/// and replaced by [`DEFAULT_SNOOZE_OPTIONS`].
pub fn snooze_options_or_default(input: &str) -> Vec<u32> {
    match parse_snooze_options(input) {
        Ok(options) => options,
        Err(e) => {
            log::warn!("Invalid format for --snooze-options ({}). Using default.", e);
            DEFAULT_SNOOZE_OPTIONS.to_vec()
        }
    }
}
