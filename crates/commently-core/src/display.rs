//! Presentation helpers shared by hosts and the CLI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How comment timestamps are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// Relative to now ("3 hours ago")
    #[default]
    Diff,
    /// Absolute ("2024/5/2 17:48")
    Standard,
}

impl DateFormat {
    /// Render `at` as seen at `now`
    pub fn render(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> String {
        match self {
            DateFormat::Diff => relative(at, now),
            DateFormat::Standard => at.format("%Y/%-m/%-d %H:%M").to_string(),
        }
    }
}

fn relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(at).num_seconds();
    if seconds < 0 {
        return "just now".to_string();
    }

    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const WEEK: i64 = 7 * DAY;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    let (amount, unit) = match seconds {
        s if s < 10 => return "just now".to_string(),
        s if s < MINUTE => (s, "second"),
        s if s < HOUR => (s / MINUTE, "minute"),
        s if s < DAY => (s / HOUR, "hour"),
        s if s < WEEK => (s / DAY, "day"),
        s if s < MONTH => (s / WEEK, "week"),
        s if s < YEAR => (s / MONTH, "month"),
        s => (s / YEAR, "year"),
    };

    if amount == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", amount, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 17, 48, 5).unwrap()
    }

    #[test]
    fn test_standard_format() {
        assert_eq!(DateFormat::Standard.render(at(), at()), "2024/5/2 17:48");
    }

    #[test]
    fn test_diff_format() {
        let base = at();
        let fmt = DateFormat::Diff;
        assert_eq!(fmt.render(base, base), "just now");
        assert_eq!(fmt.render(base, base + Duration::seconds(30)), "30 seconds ago");
        assert_eq!(fmt.render(base, base + Duration::minutes(1)), "1 minute ago");
        assert_eq!(fmt.render(base, base + Duration::hours(3)), "3 hours ago");
        assert_eq!(fmt.render(base, base + Duration::days(2)), "2 days ago");
        assert_eq!(fmt.render(base, base + Duration::days(14)), "2 weeks ago");
        assert_eq!(fmt.render(base, base + Duration::days(65)), "2 months ago");
        assert_eq!(fmt.render(base, base + Duration::days(800)), "2 years ago");
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        let base = at();
        assert_eq!(DateFormat::Diff.render(base + Duration::minutes(5), base), "just now");
    }
}
