use chrono::{DateTime, Months, Utc};

pub const DEFAULT_RETENTION_MONTHS: u32 = 3;

/// How long activity stays visible before it becomes eligible for retirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    months: u32,
}

impl Default for RetentionWindow {
    fn default() -> Self {
        Self::months(DEFAULT_RETENTION_MONTHS)
    }
}

impl RetentionWindow {
    pub fn months(months: u32) -> Self {
        Self { months }
    }

    /// Items created strictly before the returned instant are past the window.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        created_at < self.cutoff(now)
    }
}

/// Parse the timestamps found in API payloads and exports.
///
/// Accepts the remote format (`Wed Oct 10 20:19:24 +0000 2018`) as well as
/// RFC 3339.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_str(s, "%a %b %d %H:%M:%S %z %Y")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cutoff_is_three_months_back() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let cutoff = RetentionWindow::default().cutoff(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_cutoff_clamps_to_month_end() {
        let now = Utc.with_ymd_and_hms(2024, 5, 31, 0, 0, 0).unwrap();
        let cutoff = RetentionWindow::default().cutoff(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_is_expired() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let window = RetentionWindow::default();
        assert!(window.is_expired(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(), now));
        assert!(!window.is_expired(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(), now));
    }

    #[test]
    fn test_parse_remote_timestamp() {
        let parsed = parse_timestamp("Wed Oct 10 20:19:24 +0000 2018").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        let parsed = parse_timestamp("2018-10-10T22:19:24+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}
