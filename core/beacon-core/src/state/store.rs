//! File-backed session record store.
//!
//! One JSON file per session record under the store root, written via
//! temp-file + atomic rename. Writers are separate OS processes (one hook
//! invocation per lifecycle event plus the polling loop), so no in-process
//! lock can serialize them; the rename is the only concurrency-safety
//! mechanism, and it is sufficient because readers either see the old file
//! or the new one, never a torn record.
//!
//! # Defensive Design
//!
//! A corrupt or unreadable record file is treated as absent on `get`,
//! skipped on `list`, and deleted outright when a write path touches it.
//! Readers never fail the whole scan because one record is mid-replace.

use std::path::{Path, PathBuf};

use chrono::Utc;
use fs_err as fs;
use std::io::Write;
use tempfile::NamedTempFile;

use crate::error::{BeaconError, Result};

use super::types::{SessionPatch, SessionRecord, TerminalTarget};

/// Handle to a store root directory. Cheap to clone; every component that
/// reads or writes records takes one at construction.
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).map_err(|e| BeaconError::StoreUnavailable {
            path: root.to_path_buf(),
            source: e,
        })?;
        Ok(StateStore {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, session_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_id(session_id)))
    }

    /// Returns the record, or None if absent or unparseable. A corrupt file
    /// is deleted so the next write starts clean.
    pub fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.read_record(&self.record_path(session_id))
    }

    fn read_record(&self, path: &Path) -> Option<SessionRecord> {
        let content = fs::read_to_string(path).ok()?;
        match serde_json::from_str::<SessionRecord>(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Removing corrupt session record");
                let _ = fs::remove_file(path);
                None
            }
        }
    }

    /// Creates the record if absent (unset fields defaulting per
    /// [`SessionRecord::new`], state to idle) or merges `patch` into the
    /// existing record. Refreshes `updated_at` either way.
    pub fn upsert(&self, session_id: &str, patch: &SessionPatch) -> Result<SessionRecord> {
        let mut record = self
            .get(session_id)
            .unwrap_or_else(|| SessionRecord::new(session_id));
        record.apply(patch);
        record.updated_at = Utc::now();
        self.write_record(&record)?;
        Ok(record)
    }

    /// Applies `patch` to an existing record. A no-op (returns false) when
    /// the record does not exist — partial updates never create.
    pub fn update(&self, session_id: &str, patch: &SessionPatch) -> Result<bool> {
        let Some(mut record) = self.get(session_id) else {
            return Ok(false);
        };
        record.apply(patch);
        record.updated_at = Utc::now();
        self.write_record(&record)?;
        Ok(true)
    }

    /// Removes the record. Idempotent: deleting an absent id is not an error.
    pub fn delete(&self, session_id: &str) -> Result<()> {
        match fs::remove_file(self.record_path(session_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BeaconError::Io {
                context: format!("delete record {}", session_id),
                source: e,
            }),
        }
    }

    /// Returns all parseable records. Individual read/parse failures are
    /// skipped (a concurrent writer may be mid-replace); only a failure to
    /// scan the root directory itself is an error, which callers retry on
    /// their next tick.
    pub fn list(&self) -> Result<Vec<SessionRecord>> {
        let entries = fs::read_dir(&self.root).map_err(|e| BeaconError::StoreUnavailable {
            path: self.root.clone(),
            source: e,
        })?;

        let mut records = Vec::new();
        for entry in entries {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = self.read_record(&path) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Bulk delete by process id, used for liveness GC. Evaluates the
    /// predicate over a completed scan first, then deletes — the store is
    /// never mutated mid-iteration. Records with `pid == 0` are never
    /// candidates: an unknown pid is not evidence of death.
    pub fn delete_where_pid<F>(&self, mut dead: F) -> Result<u32>
    where
        F: FnMut(u32) -> bool,
    {
        let doomed: Vec<String> = self
            .list()?
            .into_iter()
            .filter(|r| r.pid > 0 && dead(r.pid))
            .map(|r| r.session_id)
            .collect();

        let mut removed = 0;
        for session_id in doomed {
            tracing::debug!(session = %session_id, "Removing record for dead process");
            self.delete(&session_id)?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Deletes every record (other than `keep_id`) pointing at `target`.
    /// Run at session start so an agent restarting in the same pane
    /// supersedes the orphaned record it left behind.
    pub fn delete_by_target(&self, target: &TerminalTarget, keep_id: &str) -> Result<()> {
        let doomed: Vec<String> = self
            .list()?
            .into_iter()
            .filter(|r| r.session_id != keep_id && r.target.as_ref() == Some(target))
            .map(|r| r.session_id)
            .collect();

        for session_id in doomed {
            tracing::debug!(
                session = %session_id,
                target = %target,
                "Superseding record sharing terminal target"
            );
            self.delete(&session_id)?;
        }
        Ok(())
    }

    fn write_record(&self, record: &SessionRecord) -> Result<()> {
        let content =
            serde_json::to_string_pretty(record).map_err(|e| BeaconError::Json {
                context: format!("serialize record {}", record.session_id),
                source: e,
            })?;

        // Temp file in the same directory so persist() is a same-filesystem
        // rename, which is what makes the replace atomic.
        let mut temp = NamedTempFile::new_in(&self.root).map_err(|e| BeaconError::Io {
            context: "create temp record file".to_string(),
            source: e,
        })?;
        temp.write_all(content.as_bytes())
            .map_err(|e| BeaconError::Io {
                context: "write temp record file".to_string(),
                source: e,
            })?;
        temp.flush().map_err(|e| BeaconError::Io {
            context: "flush temp record file".to_string(),
            source: e,
        })?;
        temp.persist(self.record_path(&record.session_id))
            .map_err(|e| BeaconError::Io {
                context: format!("persist record {}", record.session_id),
                source: e.error,
            })?;
        Ok(())
    }
}

/// Session ids are opaque strings assigned externally; keep the file name
/// safe regardless of what they contain. When any character had to be
/// replaced, a hash of the raw id is appended so distinct ids (`a/b` vs
/// `a_b`) cannot collapse to the same file.
fn sanitize_id(session_id: &str) -> String {
    let safe: String = session_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe == session_id {
        return safe;
    }
    let hash = format!("{:x}", md5::compute(session_id));
    format!("{}-{}", safe, &hash[..8])
}
