//! Snapshot files: a JSON array of user records per pool.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use cbr_core::{PoolId, UserRecord};

use crate::error::PipelineError;

/// Path of the snapshot for `pool` inside `directory`.
pub fn snapshot_path(directory: &Path, pool: &PoolId) -> PathBuf {
    directory.join(format!("{}.json", pool))
}

/// Write `users` to `path` as a pretty-printed JSON array.
///
/// The content goes to a sibling `.tmp` file first and is renamed into
/// place once flushed, so `path` holds either the complete snapshot or
/// whatever was there before.
pub fn write_snapshot(path: &Path, users: &[UserRecord]) -> Result<(), PipelineError> {
    let write_err = |source: std::io::Error| PipelineError::SnapshotWrite {
        path: path.to_path_buf(),
        source,
    };

    let content = serde_json::to_vec_pretty(users).map_err(|e| write_err(e.into()))?;

    let temp_path = path.with_extension("json.tmp");
    let result = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(&content)?;
            file.write_all(b"\n")?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(write_err(e));
    }

    debug!(path = %path.display(), users = users.len(), "Wrote snapshot");
    Ok(())
}

/// Read a snapshot written by [`write_snapshot`].
///
/// Any read failure, or content that is not a JSON array of user records,
/// is a [`PipelineError::SnapshotFormat`].
pub fn read_snapshot(path: &Path) -> Result<Vec<UserRecord>, PipelineError> {
    let format_err = |reason: String| PipelineError::SnapshotFormat {
        path: path.to_path_buf(),
        reason,
    };

    let content = fs::read(path).map_err(|e| format_err(e.to_string()))?;
    let users: Vec<UserRecord> =
        serde_json::from_slice(&content).map_err(|e| format_err(e.to_string()))?;

    debug!(path = %path.display(), users = users.len(), "Read snapshot");
    Ok(users)
}
