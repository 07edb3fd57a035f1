//! Progress aggregation over completed session records.
//!
//! Everything here is a pure function of its inputs: the same records and
//! `now` always give the same summary, and nothing is cached between calls.

use crate::{CompletedSessionRecord, HistoryEntry, ProgressSummary, TrendPoint};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default trailing window for the volume trend
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Default length of the recent workouts list
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Knobs for [`build_report`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressOptions {
    pub window_days: u32,
    pub history_limit: usize,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Summary plus recent workouts, as shown on the progress screen
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressReport {
    pub summary: ProgressSummary,
    pub history: Vec<HistoryEntry>,
}

/// Compute summary statistics for one user's records.
///
/// - `completed_workouts_count` counts every record
/// - `total_weight_lifted` is lifetime volume, not bounded by the window
/// - `recent_trend` has one point per record started within
///   `[now - window_days, now]`, ascending by start time; records sharing a
///   start time keep their input order, and same-day sessions are not merged
///
/// Volumes are recomputed from the recorded sets.
pub fn summarize(
    records: &[CompletedSessionRecord],
    now: DateTime<Utc>,
    window_days: u32,
) -> ProgressSummary {
    let total_weight_lifted: f64 = records
        .iter()
        .map(CompletedSessionRecord::recompute_volume)
        .sum();

    // Windows reaching past the earliest representable time cover all history
    let window_start = now
        .checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut recent: Vec<&CompletedSessionRecord> = records
        .iter()
        .filter(|r| r.started_at >= window_start && r.started_at <= now)
        .collect();

    // Stable sort: equal start times stay in input order
    recent.sort_by_key(|r| r.started_at);

    let recent_trend = recent
        .into_iter()
        .map(|r| TrendPoint {
            date: r.started_at.date_naive(),
            volume: r.recompute_volume(),
        })
        .collect();

    let summary = ProgressSummary {
        completed_workouts_count: records.len(),
        total_weight_lifted,
        recent_trend,
    };

    tracing::debug!(
        "Summarized {} records: total volume {}, {} in last {} days",
        summary.completed_workouts_count,
        summary.total_weight_lifted,
        summary.recent_workouts_count(),
        window_days
    );

    summary
}

/// Most recent workouts first, at most `limit` entries
pub fn recent_history(records: &[CompletedSessionRecord], limit: usize) -> Vec<HistoryEntry> {
    let mut ordered: Vec<&CompletedSessionRecord> = records.iter().collect();
    ordered.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    ordered
        .into_iter()
        .take(limit)
        .map(|r| HistoryEntry {
            record_id: r.id,
            workout_title: r.workout_title.clone(),
            started_at: r.started_at,
            duration_seconds: r.duration_seconds,
            completed_sets: r.completed_sets().count(),
            total_sets: r.set_count(),
            volume: r.recompute_volume(),
        })
        .collect()
}

/// Summary and recent history in one pass over the records
pub fn build_report(
    records: &[CompletedSessionRecord],
    now: DateTime<Utc>,
    options: &ProgressOptions,
) -> ProgressReport {
    ProgressReport {
        summary: summarize(records, now, options.window_days),
        history: recent_history(records, options.history_limit),
    }
}
