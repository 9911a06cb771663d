use chrono::{DateTime, Utc};

#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `"1h 5m"` for an hour or more, `"42m"` otherwise. Seconds are truncated.
#[must_use]
pub fn format_duration(duration_ms: u64) -> String {
    let total_minutes = duration_ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, "0m")]
    #[case(59_999, "0m")]
    #[case(600_000, "10m")]
    #[case(3_600_000, "1h 0m")]
    #[case(5_430_000, "1h 30m")]
    fn formats_durations(#[case] duration_ms: u64, #[case] expected: &str) {
        assert_eq!(format_duration(duration_ms), expected);
    }
}
