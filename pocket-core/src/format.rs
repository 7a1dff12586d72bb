//! Small pure formatting helpers shared by presentation code.

use chrono::DateTime;

const DIRECTIONS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Format a Unix timestamp as a local `HH:MM` clock string by shifting it with
/// the location's UTC offset. A zero timestamp means "field missing upstream"
/// and renders as `--:--`.
pub fn format_time(unix: i64, timezone_offset: i32) -> String {
    if unix == 0 {
        return "--:--".to_string();
    }

    DateTime::from_timestamp(unix + i64::from(timezone_offset), 0)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Map wind direction degrees to a 16-point compass label.
pub fn degrees_to_cardinal(deg: f64) -> &'static str {
    if !deg.is_finite() {
        return "--";
    }

    let index = ((deg / 22.5).round() as i64).rem_euclid(16) as usize;
    DIRECTIONS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_shifts_by_offset() {
        // 2021-01-01 12:00:00 UTC, offset +01:00.
        assert_eq!(format_time(1_609_502_400, 3600), "13:00");
    }

    #[test]
    fn format_time_zero_is_missing() {
        assert_eq!(format_time(0, 3600), "--:--");
    }

    #[test]
    fn format_time_negative_offset() {
        assert_eq!(format_time(1_609_502_400, -18_000), "07:00");
    }

    #[test]
    fn cardinal_cardinal_points() {
        assert_eq!(degrees_to_cardinal(0.0), "N");
        assert_eq!(degrees_to_cardinal(90.0), "E");
        assert_eq!(degrees_to_cardinal(180.0), "S");
        assert_eq!(degrees_to_cardinal(270.0), "W");
    }

    #[test]
    fn cardinal_rounds_to_nearest_point() {
        assert_eq!(degrees_to_cardinal(11.0), "N");
        assert_eq!(degrees_to_cardinal(11.3), "NNE");
        assert_eq!(degrees_to_cardinal(350.0), "N");
    }

    #[test]
    fn cardinal_wraps_past_360() {
        assert_eq!(degrees_to_cardinal(360.0), "N");
        assert_eq!(degrees_to_cardinal(361.0), "N");
    }

    #[test]
    fn cardinal_non_finite_is_placeholder() {
        assert_eq!(degrees_to_cardinal(f64::NAN), "--");
    }
}
