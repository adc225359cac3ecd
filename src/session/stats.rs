//! Progress statistics over a principal's session history
//!
//! Mirrors the dashboard figures: sessions today, best and latest baseline
//! hold, active days, the current day streak and the recent baseline trend.

use super::types::{SessionKind, SessionRecord};
use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::BTreeSet;

/// Number of baselines kept in the trend
pub const TREND_LENGTH: usize = 7;

/// One point of the baseline trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// Calendar day of the baseline, in the caller's time zone
    pub date: NaiveDate,
    /// Measured hold in seconds
    pub seconds: u32,
}

/// Aggregated progress figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ProgressStats {
    /// All sessions on record
    pub total_sessions: usize,
    /// Sessions whose start falls on the current day
    pub sessions_today: usize,
    /// Longest baseline hold ever recorded
    pub best_hold: Option<u32>,
    /// Most recent baseline hold
    pub latest_hold: Option<u32>,
    /// Distinct days with at least one session
    pub active_days: usize,
    /// Consecutive days, ending today, with at least one session
    pub current_streak: u32,
    /// Last baselines in ascending date order
    pub baseline_trend: Vec<TrendPoint>,
}

impl ProgressStats {
    /// Compute statistics relative to `now`
    ///
    /// Day boundaries are taken in `now`'s time zone.
    pub fn compute<Tz: TimeZone>(records: &[SessionRecord], now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let day_of = |record: &SessionRecord| record.occurred_at.with_timezone(&tz).date_naive();
        let today = now.date_naive();

        let sessions_today = records.iter().filter(|r| day_of(*r) == today).count();

        let mut baselines: Vec<&SessionRecord> = records
            .iter()
            .filter(|r| r.kind == SessionKind::Baseline)
            .filter(|r| r.max_hold_seconds.map_or(false, |s| s > 0))
            .collect();
        baselines.sort_by_key(|r| r.occurred_at);

        let best_hold = baselines.iter().filter_map(|r| r.max_hold_seconds).max();
        let latest_hold = baselines.last().and_then(|r| r.max_hold_seconds);

        let baseline_trend = baselines
            .iter()
            .skip(baselines.len().saturating_sub(TREND_LENGTH))
            .map(|r| TrendPoint {
                date: day_of(*r),
                seconds: r.max_hold_seconds.unwrap_or(0),
            })
            .collect();

        let days: BTreeSet<NaiveDate> = records.iter().map(day_of).collect();

        Self {
            total_sessions: records.len(),
            sessions_today,
            best_hold,
            latest_hold,
            active_days: days.len(),
            current_streak: streak_ending(&days, today),
            baseline_trend,
        }
    }
}

fn streak_ending(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        day = day - Duration::days(1);
    }
    streak
}
