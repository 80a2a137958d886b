use crate::core::histogram::MINUTES_PER_DAY;

/// Render a minute count as zero-padded `HH:MM`.
///
/// Minute-of-day values wrap at 24h. A full day of sleep (1440 minutes)
/// renders as `24:00` rather than `00:00`.
pub trait FormatHM {
    fn format_hm(&self) -> String;
}

impl FormatHM for u32 {
    fn format_hm(&self) -> String {
        let minutes = if *self == MINUTES_PER_DAY {
            *self
        } else {
            self % MINUTES_PER_DAY
        };
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

/// Two-decimal rendering used for every string metric in the report.
pub fn format_2dp(value: f64) -> String {
    format!("{value:.2}")
}
