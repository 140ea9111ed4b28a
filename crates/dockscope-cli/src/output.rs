//! Formatted output helpers for CLI commands.
//!
//! Provides human-readable byte sizes and relative times, and elides long
//! names to keep tables aligned.

use chrono::{DateTime, Utc};

const LONG_NAME: usize = 35;
const ELIDED_SIDE: usize = 16;

/// Formats a byte count with two decimals in 1024-based units (e.g., "1.50 KB").
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Shortens names longer than 35 characters to their first and last 16.
#[must_use]
pub fn elide(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= LONG_NAME {
        return name.to_string();
    }
    let head: String = chars[..ELIDED_SIDE].iter().collect();
    let tail: String = chars[chars.len() - ELIDED_SIDE..].iter().collect();
    format!("{head}...{tail}")
}

/// Describes `then` relative to `now`, e.g. "3 hours ago".
#[must_use]
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    let (count, unit) = match seconds {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 86_400 * 30 => (s / 86_400, "day"),
        s if s < 86_400 * 365 => (s / (86_400 * 30), "month"),
        s => (s / (86_400 * 365), "year"),
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {unit}{plural} ago")
}

/// Renders an optional time relative to now, or `-`.
#[must_use]
pub fn since(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(|| "-".to_string(), |t| relative_time(t, Utc::now()))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn format_bytes_displays_zero() {
        assert_eq!(format_bytes(0), "0 B");
    }

    #[test]
    fn format_bytes_displays_bytes() {
        assert_eq!(format_bytes(512), "512.00 B");
    }

    #[test]
    fn format_bytes_displays_kb() {
        assert_eq!(format_bytes(1536), "1.50 KB");
    }

    #[test]
    fn format_bytes_displays_mb() {
        assert_eq!(format_bytes(134_217_728), "128.00 MB");
    }

    #[test]
    fn format_bytes_caps_at_tb() {
        assert_eq!(format_bytes(2 * 1024_u64.pow(5)), "2048.00 TB");
    }

    #[test]
    fn short_names_are_kept() {
        assert_eq!(elide("shop-web-1"), "shop-web-1");
        assert_eq!(elide(&"a".repeat(35)), "a".repeat(35));
    }

    #[test]
    fn long_names_are_elided() {
        let name = "registry.example.com/team/very-long-image-name:1.2.3";
        assert_eq!(elide(name), "registry.example...image-name:1.2.3");
    }

    #[test]
    fn relative_time_units() {
        let now = Utc::now();
        assert_eq!(relative_time(now - Duration::seconds(10), now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(relative_time(now - Duration::days(40), now), "1 month ago");
        assert_eq!(relative_time(now - Duration::days(800), now), "2 years ago");
    }
}
