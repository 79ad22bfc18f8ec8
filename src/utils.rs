//! General utilities.

use std::time::{SystemTime, UNIX_EPOCH};

/// Layout of timestamps in result records.
pub const RESULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a Unix timestamp (UTC) with [`RESULT_TIMESTAMP_FORMAT`].
///
/// Timestamps chrono can't represent format as the epoch.
pub fn format_result_timestamp(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .unwrap_or_default()
        .format(RESULT_TIMESTAMP_FORMAT)
        .to_string()
}

/// Get current Unix timestamp in seconds, respecting `SOURCE_DATE_EPOCH`.
///
/// When `SOURCE_DATE_EPOCH` is set, returns that value instead of the actual
/// current time, so result records and test snapshots are reproducible.
pub fn get_now() -> u64 {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_now_returns_reasonable_timestamp() {
        // After 2020-01-01
        assert!(get_now() > 1577836800);
    }

    #[test]
    fn test_get_now_respects_source_date_epoch() {
        if let Ok(epoch) = std::env::var("SOURCE_DATE_EPOCH") {
            let expected: u64 = epoch.parse().unwrap();
            assert_eq!(get_now(), expected);
        }
    }

    #[test]
    fn test_format_result_timestamp() {
        assert_eq!(format_result_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_result_timestamp(1_735_689_600), "2025-01-01 00:00:00");
        assert_eq!(format_result_timestamp(u64::MAX), "1970-01-01 00:00:00");
    }
}
