//! Gateway timestamps (`YYYYMMDDHHMMSS`) and query windows

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use smsgate_core::{GatewayError, Result};

pub const GATEWAY_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Longest relative window accepted: one leap year
pub const MAX_WINDOW_HOURS: i64 = 24 * 366;

pub fn format_gateway_time(time: DateTime<Utc>) -> String {
    time.format(GATEWAY_TIME_FORMAT).to_string()
}

pub fn is_gateway_time(value: &str) -> bool {
    value.len() == 14 && NaiveDateTime::parse_from_str(value, GATEWAY_TIME_FORMAT).is_ok()
}

/// Inclusive `[begintime, endtime]` range for inbox/outbox queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub begintime: String,
    pub endtime: String,
}

impl TimeWindow {
    pub fn new(begintime: impl Into<String>, endtime: impl Into<String>) -> Result<Self> {
        let window = Self {
            begintime: begintime.into(),
            endtime: endtime.into(),
        };

        for value in [&window.begintime, &window.endtime] {
            if !is_gateway_time(value) {
                return Err(GatewayError::Validation(format!(
                    "Invalid gateway time '{}', expected YYYYMMDDHHMMSS",
                    value
                )));
            }
        }
        // fixed-width digits compare chronologically
        if window.begintime > window.endtime {
            return Err(GatewayError::Validation(
                "begintime must not be after endtime".to_string(),
            ));
        }

        Ok(window)
    }

    /// `[end - hours, end]`. `hours` must be in `1..=MAX_WINDOW_HOURS`.
    pub fn ending_at(end: DateTime<Utc>, hours: i64) -> Result<Self> {
        if hours <= 0 || hours > MAX_WINDOW_HOURS {
            return Err(GatewayError::Validation(format!(
                "Window must span 1 to {} hours, got {}",
                MAX_WINDOW_HOURS, hours
            )));
        }

        let begin = TimeDelta::try_hours(hours)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| {
                GatewayError::Validation(format!("Window of {} hours is out of range", hours))
            })?;

        Ok(Self {
            begintime: format_gateway_time(begin),
            endtime: format_gateway_time(end),
        })
    }

    pub fn last_hours(hours: i64) -> Result<Self> {
        Self::ending_at(Utc::now(), hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_format_gateway_time() {
        let time = Utc.with_ymd_and_hms(2025, 12, 19, 20, 33, 30).unwrap();
        assert_eq!(format_gateway_time(time), "20251219203330");
    }

    #[test]
    fn test_is_gateway_time() {
        assert!(is_gateway_time("20251219203330"));
        assert!(!is_gateway_time("2025-12-19"));
        assert!(!is_gateway_time("20251399203330"));
        assert!(!is_gateway_time("202512192033301"));
    }

    #[test]
    fn test_window_validation() {
        let window = assert_ok!(TimeWindow::new("20251219000000", "20251219235959"));
        assert_eq!(window.begintime, "20251219000000");

        // single-instant window is allowed
        assert_ok!(TimeWindow::new("20251219000000", "20251219000000"));

        assert_err!(TimeWindow::new("20251220000000", "20251219235959"));
        assert_err!(TimeWindow::new("yesterday", "20251219235959"));
    }

    #[test]
    fn test_ending_at() {
        let end = Utc.with_ymd_and_hms(2025, 12, 19, 12, 0, 0).unwrap();
        let window = assert_ok!(TimeWindow::ending_at(end, 24));

        assert_eq!(window.begintime, "20251218120000");
        assert_eq!(window.endtime, "20251219120000");
    }

    #[test]
    fn test_ending_at_rejects_non_positive_hours() {
        let end = Utc.with_ymd_and_hms(2025, 12, 19, 12, 0, 0).unwrap();

        let err = assert_err!(TimeWindow::ending_at(end, 0));
        assert!(matches!(err, GatewayError::Validation(_)));
        assert_err!(TimeWindow::ending_at(end, -5));
    }

    #[test]
    fn test_ending_at_rejects_huge_hours() {
        let end = Utc.with_ymd_and_hms(2025, 12, 19, 12, 0, 0).unwrap();

        assert_err!(TimeWindow::ending_at(end, MAX_WINDOW_HOURS + 1));
        assert_err!(TimeWindow::ending_at(end, 3_000_000_000));
        assert_err!(TimeWindow::last_hours(i64::MAX));

        let window = assert_ok!(TimeWindow::ending_at(end, MAX_WINDOW_HOURS));
        assert!(window.begintime < window.endtime);
    }
}
