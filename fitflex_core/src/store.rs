//! Persistence collaborators for completed session records.
//!
//! The engine only needs two operations from storage: `store` a finished
//! record and `fetch_history` for a user. Records come back in insertion
//! order so downstream tie-breaking stays deterministic.

use crate::{CompletedSessionRecord, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Storage for completed session records
pub trait SessionStore {
    /// Persist a finished session's record
    fn store(&mut self, record: &CompletedSessionRecord) -> Result<()>;

    /// Records for `user_id` in insertion order, optionally only those
    /// started at or after `since`
    fn fetch_history(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<CompletedSessionRecord>>;
}

fn belongs_to(record: &CompletedSessionRecord, user_id: &str, since: Option<DateTime<Utc>>) -> bool {
    record.user_id == user_id && since.map_or(true, |s| record.started_at >= s)
}

/// JSONL-based record store with file locking
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Create a new JSONL store for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionStore for JsonlStore {
    fn store(&mut self, record: &CompletedSessionRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        if ends_mid_line(&file)? {
            tracing::warn!("Record file {:?} ends in a partial line", self.path);
            writer.write_all(b"\n")?;
        }
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::info!(
            "Stored session {} for user {} ({} sets)",
            record.id,
            record.user_id,
            record.set_count()
        );
        Ok(())
    }

    fn fetch_history(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<CompletedSessionRecord>> {
        let records = read_records(&self.path)?
            .into_iter()
            .filter(|r| belongs_to(r, user_id, since))
            .collect::<Vec<_>>();

        tracing::debug!("Fetched {} records for user {}", records.len(), user_id);
        Ok(records)
    }
}

/// Whether a crash left the last line without its newline
fn ends_mid_line(mut file: &File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Read all records from a JSONL file
///
/// Missing files read as empty. Lines that fail to parse are skipped with a
/// warning rather than failing the whole read.
pub fn read_records(path: &Path) -> Result<Vec<CompletedSessionRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CompletedSessionRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse record at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

/// In-memory record store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: Vec<CompletedSessionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn store(&mut self, record: &CompletedSessionRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn fetch_history(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<CompletedSessionRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| belongs_to(r, user_id, since))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordedSet;
    use chrono::Duration;
    use uuid::Uuid;

    fn create_test_record(user_id: &str, days_ago: i64) -> CompletedSessionRecord {
        let started_at = Utc::now() - Duration::days(days_ago);
        CompletedSessionRecord {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            workout_id: "full_body_blast".into(),
            workout_title: "Full Body Blast".into(),
            started_at,
            completed_at: started_at + Duration::minutes(45),
            duration_seconds: 2700,
            sets: vec![RecordedSet {
                exercise_name: "Squats".into(),
                exercise_order: 1,
                set_number: 1,
                target_reps: 8,
                target_weight: 185.0,
                completed: true,
            }],
            total_volume: 1480.0,
        }
    }

    #[test]
    fn test_store_and_fetch_single_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("wal").join("sessions.jsonl");

        let record = create_test_record("alice", 1);
        let mut store = JsonlStore::new(&path);
        store.store(&record).unwrap();

        let records = store.fetch_history("alice", None).unwrap();
        assert_eq!(records, vec![record]);
    }

    #[test]
    fn test_fetch_filters_user_and_since() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::new(temp_dir.path().join("sessions.jsonl"));

        store.store(&create_test_record("alice", 40)).unwrap();
        store.store(&create_test_record("bob", 1)).unwrap();
        store.store(&create_test_record("alice", 2)).unwrap();

        assert_eq!(store.fetch_history("alice", None).unwrap().len(), 2);
        assert_eq!(store.fetch_history("bob", None).unwrap().len(), 1);

        let since = Utc::now() - Duration::days(30);
        let recent = store.fetch_history("alice", Some(since)).unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].started_at >= since);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::new(temp_dir.path().join("sessions.jsonl"));

        let ids: Vec<Uuid> = (0..5)
            .map(|i| {
                let record = create_test_record("alice", 5 - i);
                store.store(&record).unwrap();
                record.id
            })
            .collect();

        let fetched: Vec<Uuid> = store
            .fetch_history("alice", None)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(fetched, ids);
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");

        let mut store = JsonlStore::new(&path);
        store.store(&create_test_record("alice", 1)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "{{ not json").unwrap();
        }
        store.store(&create_test_record("alice", 0)).unwrap();

        assert_eq!(store.fetch_history("alice", None).unwrap().len(), 2);
    }

    #[test]
    fn test_append_after_torn_line() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");

        let mut store = JsonlStore::new(&path);
        store.store(&create_test_record("alice", 1)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            write!(file, "{{\"id\":\"torn").unwrap();
        }
        store.store(&create_test_record("alice", 0)).unwrap();

        assert_eq!(store.fetch_history("alice", None).unwrap().len(), 2);
    }

    #[test]
    fn test_extreme_weights_survive_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::new(temp_dir.path().join("sessions.jsonl"));

        let catalog = crate::build_default_catalog();
        let mut session =
            crate::WorkoutSession::from_template("alice", catalog.template("yoga_flow").unwrap())
                .unwrap();
        session.start().unwrap();
        session.adjust_set_weight(0, 0, f64::MAX).unwrap();
        session.adjust_set_weight(0, 0, f64::MAX).unwrap();
        session.advance_exercise().unwrap();
        session.advance_exercise().unwrap();
        let record = session.finish().unwrap();
        assert!(record.sets[0].target_weight.is_finite());

        store.store(&record).unwrap();
        let fetched = store.fetch_history("alice", None).unwrap();
        assert_eq!(fetched, vec![record]);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(temp_dir.path().join("nonexistent.jsonl"));
        assert!(store.fetch_history("alice", None).unwrap().is_empty());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());

        store.store(&create_test_record("alice", 3)).unwrap();
        store.store(&create_test_record("bob", 1)).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.fetch_history("alice", None).unwrap().len(), 1);
        assert!(store
            .fetch_history("alice", Some(Utc::now() - Duration::days(1)))
            .unwrap()
            .is_empty());
    }
}
