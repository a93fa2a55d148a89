//! Durable file store
//!
//! The whole state lives in one JSON file, `<data_dir>/store.json`:
//!
//! ```text
//! {"format_version": 1, "checksum": <crc32 of body>, "body": "<state json>"}
//! ```
//!
//! Every mutating call commits a complete new file before returning:
//! 1. Apply the change to a copy of the state
//! 2. Write the copy to a temp file and fsync it
//! 3. Rename the temp file over the store file and fsync the directory
//! 4. Only then swap the copy in as the live state
//!
//! A failure at any step leaves both the file and the live state as they
//! were. A checksum mismatch on open is corruption and is never repaired.
//!
//! The live state is a cache of the file, so a data directory has exactly
//! one owner: `open` takes an exclusive lock on `<data_dir>/store.lock` and
//! holds it until the store is dropped. A second open, from this process or
//! another, fails with `StoreError::Locked` instead of committing from a
//! stale copy.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::state::StoreState;
use super::{ChainStore, EventStore, IncidentStore};
use crate::chain::{LedgerEntry, NewLedgerEntry};
use crate::incident::{Incident, IncidentId, NewIncident};
use crate::ledger::{IncidentEvent, NewIncidentEvent};
use crate::observability::Event;

/// Store file name inside the data directory.
pub const STORE_FILE_NAME: &str = "store.json";

/// Lock file guarding the data directory.
pub const LOCK_FILE_NAME: &str = "store.lock";

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    format_version: u32,
    checksum: u32,
    body: String,
}

fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub struct FileStore {
    path: PathBuf,
    temp_path: PathBuf,
    state: Mutex<StoreState>,
    // Released by the OS when the handle closes.
    _lock: File,
}

impl FileStore {
    /// Open the store in `data_dir`, creating the directory and an empty
    /// store file if they do not exist.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(data_dir).map_err(|e| StoreError::io(data_dir, e))?;
        let lock = Self::acquire_lock(data_dir)?;

        let path = data_dir.join(STORE_FILE_NAME);
        let temp_path = data_dir.join(format!("{}.tmp", STORE_FILE_NAME));

        let state = if path.exists() {
            let state = Self::load(&path)?;
            tracing::info!(
                event = %Event::StoreLoaded,
                path = %path.display(),
                incidents = state.list_incidents().len(),
                chain_entries = state.entries().len(),
                "store loaded"
            );
            state
        } else {
            let state = StoreState::new();
            Self::write_atomic(&path, &temp_path, &state)?;
            state
        };

        Ok(Self {
            path,
            temp_path,
            state: Mutex::new(state),
            _lock: lock,
        })
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn acquire_lock(data_dir: &Path) -> StoreResult<File> {
        let lock_path = data_dir.join(LOCK_FILE_NAME);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;

        if let Err(e) = file.try_lock_exclusive() {
            if is_contended(&e) {
                return Err(StoreError::Locked(lock_path));
            }
            return Err(StoreError::io(&lock_path, e));
        }

        // Owner pid, for whoever finds the directory busy.
        file.set_len(0)
            .and_then(|_| writeln!(file, "{}", std::process::id()))
            .map_err(|e| StoreError::io(&lock_path, e))?;

        Ok(file)
    }

    fn load(path: &Path) -> StoreResult<StoreState> {
        let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;

        let file: StoreFile = serde_json::from_str(&content)
            .map_err(|e| StoreError::Corruption(format!("unreadable store envelope: {}", e)))?;

        if file.format_version != FORMAT_VERSION {
            return Err(StoreError::Corruption(format!(
                "unsupported store format version {}",
                file.format_version
            )));
        }

        let actual = compute_checksum(file.body.as_bytes());
        if actual != file.checksum {
            return Err(StoreError::Corruption(format!(
                "checksum mismatch: stored {:08x}, computed {:08x}",
                file.checksum, actual
            )));
        }

        serde_json::from_str(&file.body)
            .map_err(|e| StoreError::Corruption(format!("unreadable store body: {}", e)))
    }

    fn write_atomic(path: &Path, temp_path: &Path, state: &StoreState) -> StoreResult<()> {
        let body =
            serde_json::to_string(state).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let envelope = StoreFile {
            format_version: FORMAT_VERSION,
            checksum: compute_checksum(body.as_bytes()),
            body,
        };
        let content = serde_json::to_string(&envelope)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .map_err(|e| StoreError::io(temp_path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| StoreError::io(temp_path, e))?;
        file.sync_all().map_err(|e| StoreError::io(temp_path, e))?;

        fs::rename(temp_path, path).map_err(|e| StoreError::io(path, e))?;

        match path.parent() {
            Some(parent) => sync_dir(parent),
            None => Ok(()),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Poisoned("file store state"))
    }

    /// Apply `change` to a copy of the state, persist it, then publish it.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut StoreState) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut live = self.lock()?;
        let mut next = live.clone();
        let out = change(&mut next)?;
        Self::write_atomic(&self.path, &self.temp_path, &next)?;
        *live = next;
        tracing::trace!(event = %Event::StoreCommitted, path = %self.path.display());
        Ok(out)
    }
}

impl IncidentStore for FileStore {
    fn insert_incident(&self, new: NewIncident) -> StoreResult<Incident> {
        self.commit(|s| Ok(s.insert_incident(new)))
    }

    fn get_incident(&self, id: IncidentId) -> StoreResult<Option<Incident>> {
        Ok(self.lock()?.get_incident(id))
    }

    fn find_incident(&self, title: &str, source: &str) -> StoreResult<Option<Incident>> {
        Ok(self.lock()?.find_incident(title, source))
    }

    fn update_incident(&self, incident: &Incident) -> StoreResult<Incident> {
        self.commit(|s| s.update_incident(incident))
    }

    fn list_incidents(&self) -> StoreResult<Vec<Incident>> {
        Ok(self.lock()?.list_incidents())
    }
}

impl EventStore for FileStore {
    fn append_event(&self, new: NewIncidentEvent) -> StoreResult<IncidentEvent> {
        self.commit(|s| Ok(s.append_event(new)))
    }

    fn events_for(&self, incident_id: IncidentId) -> StoreResult<Vec<IncidentEvent>> {
        Ok(self.lock()?.events_for(incident_id))
    }
}

impl ChainStore for FileStore {
    fn append_entry(&self, new: NewLedgerEntry) -> StoreResult<LedgerEntry> {
        self.commit(|s| s.append_entry(new))
    }

    fn last_entry(&self) -> StoreResult<Option<LedgerEntry>> {
        Ok(self.lock()?.last_entry())
    }

    fn entries(&self) -> StoreResult<Vec<LedgerEntry>> {
        Ok(self.lock()?.entries())
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Make a rename inside `dir` durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> StoreResult<()> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| StoreError::io(dir, e))
}

// Directories cannot be opened for fsync here; rename is the commit point.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> StoreResult<()> {
    Ok(())
}
