//! Suspended-session persistence with file locking.
//!
//! A session that is paused can be written to disk and picked up again by a
//! later process. Finished or abandoned sessions are never saved; their
//! record (if any) lives in the session store instead.

use crate::{Error, Result, WorkoutSession};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl WorkoutSession {
    /// Load a suspended session from a file with shared locking
    ///
    /// Returns `None` if the file doesn't exist. A corrupt or inconsistent
    /// snapshot is logged and treated as absent.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!("No suspended session at {:?}", path);
            return Ok(None);
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let session = match serde_json::from_str::<WorkoutSession>(&contents) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Failed to parse suspended session {:?}: {}. Ignoring it.", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = session.check_invariants() {
            tracing::warn!("Suspended session {:?} is inconsistent: {}. Ignoring it.", path, e);
            return Ok(None);
        }
        if session.status().is_terminal() {
            tracing::warn!("Suspended session {:?} is already {}. Ignoring it.", path, session.status());
            return Ok(None);
        }

        tracing::info!("Loaded suspended session {} from {:?}", session.id(), path);
        Ok(Some(session))
    }

    /// Save the session to a file with exclusive locking
    ///
    /// Atomically writes the snapshot by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if self.status().is_terminal() {
            return Err(Error::invalid_transition(
                "suspend",
                format!("session is {}", self.status()),
            ));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "snapshot path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Suspended session {} to {:?}", self.id(), path);
        Ok(())
    }
}

/// Remove a suspended session file; missing files are fine
pub fn clear_snapshot(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed suspended session {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
