//! Weekly monitoring metrics
//!
//! Counters are kept per day-of-week and per category. All counters are
//! non-negative by construction (`u32`). Patch types merge sparsely so two
//! stages updating disjoint sub-fields cannot clobber each other.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Per-day event counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCounters {
    /// AI detections raised on camera feeds
    pub detections: u32,
    /// Live-operator interventions (voice-down, talk-down)
    pub interventions: u32,
    /// Dispatches escalated to guards or police
    pub dispatches: u32,
    /// Detections dismissed as false alarms
    pub false_alarms: u32,
}

/// Sparse update for one day's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCountersPatch {
    /// New detection count, if changed
    pub detections: Option<u32>,
    /// New intervention count, if changed
    pub interventions: Option<u32>,
    /// New dispatch count, if changed
    pub dispatches: Option<u32>,
    /// New false-alarm count, if changed
    pub false_alarms: Option<u32>,
}

impl DayCounters {
    /// Apply a sparse patch in place
    pub fn apply(&mut self, patch: DayCountersPatch) {
        if let Some(v) = patch.detections {
            self.detections = v;
        }
        if let Some(v) = patch.interventions {
            self.interventions = v;
        }
        if let Some(v) = patch.dispatches {
            self.dispatches = v;
        }
        if let Some(v) = patch.false_alarms {
            self.false_alarms = v;
        }
    }

    /// Sum of all categories
    #[must_use]
    pub fn total(&self) -> u32 {
        self.detections + self.interventions + self.dispatches + self.false_alarms
    }
}

/// Metrics for one reporting week
///
/// Days are indexed Monday..Sunday; the array length is the invariant that
/// every day of the week has a counter record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyMetrics {
    /// Cameras covered by the monitoring contract
    pub total_cameras: u32,
    /// Counters per day, Monday first
    pub days: [DayCounters; 7],
}

impl WeeklyMetrics {
    /// Counters for a given day
    #[inline]
    #[must_use]
    pub fn day(&self, day: Weekday) -> &DayCounters {
        &self.days[day.num_days_from_monday() as usize]
    }

    /// Mutable counters for a given day
    #[inline]
    pub fn day_mut(&mut self, day: Weekday) -> &mut DayCounters {
        &mut self.days[day.num_days_from_monday() as usize]
    }

    /// Merge a sparse patch into the current metrics
    pub fn merge(&mut self, patch: MetricsPatch) {
        if let Some(v) = patch.total_cameras {
            self.total_cameras = v;
        }
        for (day, counters) in patch.days {
            self.day_mut(day).apply(counters);
        }
    }

    /// Week-wide total across all categories
    #[must_use]
    pub fn weekly_total(&self) -> u32 {
        self.days.iter().map(DayCounters::total).sum()
    }
}

/// Sparse update of weekly metrics
///
/// Unmentioned fields and days are left untouched by [`WeeklyMetrics::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsPatch {
    /// New camera count, if changed
    pub total_cameras: Option<u32>,
    /// Per-day counter patches
    pub days: Vec<(Weekday, DayCountersPatch)>,
}

impl MetricsPatch {
    /// Patch only the camera count
    #[must_use]
    pub fn cameras(total: u32) -> Self {
        Self {
            total_cameras: Some(total),
            days: Vec::new(),
        }
    }

    /// Add a per-day counter patch
    #[must_use]
    pub fn with_day(mut self, day: Weekday, counters: DayCountersPatch) -> Self {
        self.days.push((day, counters));
        self
    }
}
