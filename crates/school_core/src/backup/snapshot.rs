//! Consistent store snapshots.

use super::{io_error, BackupResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;

/// Copies the whole store to `dest_path` with `VACUUM INTO`.
///
/// The copy is taken inside a single read transaction and written to a
/// sibling temp file first. `dest_path` is replaced only after the copy
/// succeeds; on failure any previous file there is left as it was.
pub fn snapshot(conn: &Connection, dest_path: impl AsRef<Path>) -> BackupResult<()> {
    let dest_path = dest_path.as_ref();
    let started_at = Instant::now();

    let parent = match dest_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    // VACUUM INTO accepts an existing target only when it is empty.
    let staging = NamedTempFile::new_in(parent).map_err(io_error(parent))?;
    let target = staging.path().to_string_lossy().into_owned();

    if let Err(err) = conn.execute("VACUUM INTO ?1;", [target.as_str()]) {
        error!(
            "event=db_snapshot module=backup status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err.into());
    }

    staging
        .persist(dest_path)
        .map_err(|err| io_error(dest_path)(err.error))?;
    info!(
        "event=db_snapshot module=backup status=ok duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(())
}
