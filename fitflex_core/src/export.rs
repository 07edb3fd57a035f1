//! CSV export of session history.
//!
//! Records are flattened to one row per recorded set, which is what
//! spreadsheet tools expect. The trend export is a plain `date,volume` table.

use crate::{CompletedSessionRecord, Result, TrendPoint};
use std::io::Write;
use std::path::Path;

/// A row in the per-set CSV output
#[derive(Debug, serde::Serialize)]
struct SetRow<'a> {
    record_id: String,
    workout_id: &'a str,
    workout_title: &'a str,
    started_at: String,
    duration_seconds: u64,
    exercise_order: u32,
    exercise_name: &'a str,
    set_number: u32,
    target_reps: u32,
    target_weight: f64,
    completed: bool,
    volume: f64,
}

/// Write one row per set to `writer`; returns the number of rows
pub fn write_records<W: Write>(records: &[CompletedSessionRecord], writer: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for record in records {
        for set in &record.sets {
            writer.serialize(SetRow {
                record_id: record.id.to_string(),
                workout_id: &record.workout_id,
                workout_title: &record.workout_title,
                started_at: record.started_at.to_rfc3339(),
                duration_seconds: record.duration_seconds,
                exercise_order: set.exercise_order,
                exercise_name: &set.exercise_name,
                set_number: set.set_number,
                target_reps: set.target_reps,
                target_weight: set.target_weight,
                completed: set.completed,
                volume: set.volume(),
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}

/// Export records to a CSV file, replacing any existing file
pub fn write_records_csv(records: &[CompletedSessionRecord], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let rows = write_records(records, &file)?;
    file.sync_all()?;

    tracing::info!(
        "Exported {} sets from {} sessions to {:?}",
        rows,
        records.len(),
        path
    );
    Ok(rows)
}

/// Export a volume trend as `date,volume`
pub fn write_trend_csv(trend: &[TrendPoint], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for point in trend {
        writer.serialize(point)?;
    }
    writer.flush()?;

    tracing::info!("Exported {} trend points to {:?}", trend.len(), path);
    Ok(trend.len())
}
