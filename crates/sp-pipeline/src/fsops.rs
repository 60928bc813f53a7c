//! Filesystem discipline for stage boundaries.
//!
//! Every in-place mutation of a working file goes through
//! [`apply_atomic`]: the stage writes a sibling temporary and the rename
//! happens only on full success, so a crash or failure between stages
//! leaves the file in a well-defined prior-stage state.

use sp_core::error::{Result, SpError};
use std::path::{Path, PathBuf};

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".sp.tmp");
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| SpError::Access(format!("create {}: {e}", parent.display())))?;
    }
    Ok(())
}

/// Copy the untouched source into the backup location, overwriting any
/// earlier backup of the same name (a retried document re-backs-up).
pub fn backup_copy(source: &Path, backup: &Path) -> Result<()> {
    ensure_parent(backup)?;
    std::fs::copy(source, backup)
        .map_err(|e| SpError::Access(format!("backup {}: {e}", source.display())))?;
    Ok(())
}

/// Run `op` against a temporary sibling of `working`, then atomically
/// replace `working` with it. On any failure the temporary is removed and
/// `working` is untouched.
pub fn apply_atomic<F>(working: &Path, op: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let tmp = temp_sibling(working);
    match op(&tmp) {
        Ok(()) => std::fs::rename(&tmp, working).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            SpError::Access(format!("replace {}: {e}", working.display()))
        }),
        Err(err) => {
            let _ = std::fs::remove_file(&tmp);
            Err(err)
        }
    }
}

/// Copy the finished document to its destination. Overwrites an existing
/// copy — re-delivery after a failed archive move is last-write-wins.
pub fn deliver_copy(working: &Path, dest: &Path) -> Result<()> {
    ensure_parent(dest)?;
    std::fs::copy(working, dest)
        .map_err(|e| SpError::Access(format!("deliver {}: {e}", dest.display())))?;
    Ok(())
}

/// Move the finished document into the archive. Rename first; falls back
/// to copy-then-remove when the archive sits on another filesystem.
pub fn archive_move(working: &Path, archived: &Path) -> Result<()> {
    ensure_parent(archived)?;
    if std::fs::rename(working, archived).is_ok() {
        return Ok(());
    }
    std::fs::copy(working, archived)
        .map_err(|e| SpError::Access(format!("archive {}: {e}", archived.display())))?;
    std::fs::remove_file(working)
        .map_err(|e| SpError::Access(format!("remove {}: {e}", working.display())))?;
    Ok(())
}
