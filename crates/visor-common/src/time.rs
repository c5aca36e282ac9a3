//! Instance identifiers and the frame time axis.
//!
//! Instances are model runs named `YYYY-MM-DD_HH` (UTC start hour). Frames
//! advance in fixed steps of `ref_dt` minutes from the instance start.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

/// Parse an instance identifier into its start time.
pub fn parse_instance(instance: &str) -> Option<DateTime<Utc>> {
    let ndt = NaiveDateTime::parse_from_str(&format!("{}:00:00", instance), "%Y-%m-%d_%H:%M:%S")
        .ok()?;
    Some(Utc.from_utc_datetime(&ndt))
}

/// Timestamp of `frame` given the instance start and the time step.
pub fn frame_time(start: DateTime<Utc>, frame: usize, ref_dt_minutes: u32) -> DateTime<Utc> {
    start + Duration::minutes(frame as i64 * ref_dt_minutes as i64)
}

/// First instance whose identifier starts with a `YYYY-MM-DD` date.
pub fn instance_for_date<'a>(instances: &'a [String], date: &str) -> Option<&'a str> {
    if date.is_empty() {
        return None;
    }
    instances
        .iter()
        .find(|inst| inst.starts_with(date))
        .map(String::as_str)
}

/// Displayed time window `[start + start_hour, start + end_hour]`.
pub fn series_window(
    start: DateTime<Utc>,
    start_hour: i64,
    end_hour: i64,
) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        start + Duration::hours(start_hour),
        start + Duration::hours(end_hour),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_instance() {
        let start = parse_instance("2025-07-24_06").unwrap();
        assert_eq!(start.to_rfc3339(), "2025-07-24T06:00:00+00:00");
        assert_eq!(start.hour(), 6);
    }

    #[test]
    fn test_parse_instance_rejects_garbage() {
        assert!(parse_instance("2025-07-24").is_none());
        assert!(parse_instance("not-a-date_00").is_none());
        assert!(parse_instance("").is_none());
    }

    #[test]
    fn test_frame_time() {
        let start = parse_instance("2025-07-24_00").unwrap();
        let t = frame_time(start, 5, 15);
        assert_eq!(t.to_rfc3339(), "2025-07-24T01:15:00+00:00");
    }

    #[test]
    fn test_instance_for_date() {
        let instances = vec![
            "2025-07-23_00".to_string(),
            "2025-07-24_00".to_string(),
            "2025-07-24_12".to_string(),
        ];
        assert_eq!(
            instance_for_date(&instances, "2025-07-24"),
            Some("2025-07-24_00")
        );
        assert_eq!(instance_for_date(&instances, "2025-08-01"), None);
        assert_eq!(instance_for_date(&instances, ""), None);
    }

    #[test]
    fn test_series_window() {
        let start = parse_instance("2025-07-24_00").unwrap();
        let (lo, hi) = series_window(start, 4, 167);
        assert_eq!(lo.to_rfc3339(), "2025-07-24T04:00:00+00:00");
        assert_eq!(hi.to_rfc3339(), "2025-07-30T23:00:00+00:00");
    }
}
