//! Restricted-permission file writes.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Unix mode for files only the owner may read.
pub const PRIVATE_FILE_MODE: u32 = 0o600;
/// Unix mode for files anyone may read.
pub const PUBLIC_FILE_MODE: u32 = 0o644;

/// Write `bytes` next to its destination, with `mode` applied, without placing it yet.
///
/// Dropping the returned handle deletes the staged file.
pub fn stage_file(dir: &Path, bytes: &[u8], mode: u32) -> io::Result<NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix(".tether-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    set_permissions(staged.path(), mode)?;
    Ok(staged)
}

/// Atomically replace `path` with `bytes`, readable only by the owner.
pub fn write_private_file_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    write_file_atomic(path, bytes, PRIVATE_FILE_MODE)
}

/// Atomically replace `path` with `bytes` under the given mode.
pub fn write_file_atomic(path: &Path, bytes: &[u8], mode: u32) -> io::Result<()> {
    let parent = parent_dir(path);
    fs::create_dir_all(parent)?;
    let staged = stage_file(parent, bytes, mode)?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Applies Unix permissions when supported.
pub fn set_permissions(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}

pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
