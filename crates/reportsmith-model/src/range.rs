//! Reporting period

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Error constructing a reporting period
#[derive(Debug, thiserror::Error)]
pub enum RangeError {
    /// Start instant is after the end instant
    #[error("range start {start} is after end {end}")]
    Inverted {
        /// Requested start
        start: DateTime<Utc>,
        /// Requested end
        end: DateTime<Utc>,
    },
}

/// Inclusive reporting period
///
/// # Invariants
/// - `start <= end`, enforced at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Construct a range, validating ordering
    ///
    /// # Errors
    /// Returns [`RangeError::Inverted`] when `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// The current seven-day window ending now
    #[must_use]
    pub fn trailing_week() -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(6),
            end,
        }
    }

    /// Period start
    #[inline]
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Period end
    #[inline]
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Compact `YYYYMMDD-YYYYMMDD` label used in export names
    #[must_use]
    pub fn compact_label(&self) -> String {
        format!(
            "{}-{}",
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        )
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::trailing_week()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_inverted_range() {
        let start = Utc.with_ymd_and_hms(2026, 8, 7, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            DateRange::new(start, end),
            Err(RangeError::Inverted { .. })
        ));
    }

    #[test]
    fn accepts_equal_endpoints() {
        let t = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let range = DateRange::new(t, t).unwrap();
        assert_eq!(range.start(), range.end());
    }

    #[test]
    fn compact_label_format() {
        let start = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 8, 7, 0, 0, 0).unwrap();
        let range = DateRange::new(start, end).unwrap();
        assert_eq!(range.compact_label(), "20260801-20260807");
    }

    #[test]
    fn trailing_week_is_ordered() {
        let range = DateRange::trailing_week();
        assert!(range.start() <= range.end());
    }
}
