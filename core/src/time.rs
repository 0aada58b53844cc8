use chrono::{DateTime, Local, Utc};

/// Local `YYYY-MM-DD` form of a UTC timestamp, as shown next to a finished
/// translation.
pub fn format_local_date(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_as_iso_date() {
        let time = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let formatted = format_local_date(time);
        assert_eq!(formatted.len(), 10);
        // local offset can move noon UTC by a day either way
        assert!(formatted.starts_with("2024-03-1"));
    }
}
