//! Common filesystem utilities
//!
//! Shared by the installer and the clean hook.

use std::io;
use std::path::Path;

/// Ensure a file's parent directory exists.
///
/// Creates the parent directory (and all ancestors) if it doesn't exist.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Copy a file, creating parent directories as needed.
pub fn copy_file(src: &Path, dest: &Path) -> io::Result<u64> {
    ensure_parent_dir(dest)?;
    std::fs::copy(src, dest)
}

/// Re-create a symlink at `dest` pointing where `src` points.
///
/// An existing entry at `dest` is replaced. On non-Unix platforms the link
/// target is copied instead.
#[cfg(unix)]
pub fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    ensure_parent_dir(dest)?;
    let target = std::fs::read_link(src)?;
    if dest.symlink_metadata().is_ok() {
        std::fs::remove_file(dest)?;
    }
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
pub fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    copy_file(src, dest).map(|_| ())
}

/// Remove a directory tree. A missing directory is not an error.
pub fn remove_dir_all_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
