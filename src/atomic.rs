//! Atomic file replacement for definitions and configuration files.
//!
//! A rewritten API definition replaces the user's original file, so a crash or
//! a full disk halfway through serialization must never leave a truncated
//! definition behind. Writes go to a temporary sibling file which is then
//! renamed over the destination.
//!
//! - On POSIX systems, `rename(2)` is atomic within the same filesystem.
//! - On Windows, `std::fs::rename` uses `MoveFileEx` with `MOVEFILE_REPLACE_EXISTING`,
//!   which is atomic for same-volume renames.

use std::path::{Path, PathBuf};

/// Write `data` to `path` atomically by writing to a temporary sibling file
/// and then renaming it into place.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory of `path` does not exist.
/// - The temp file cannot be created or written.
/// - The rename operation fails.
pub async fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let temp_path = temp_sibling(path);

    tokio::fs::write(&temp_path, data).await?;

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    Ok(())
}

/// Synchronous version of [`atomic_write`], used when saving the global
/// configuration.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write_sync(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let temp_path = temp_sibling(path);

    std::fs::write(&temp_path, data)?;

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(())
}

/// Hidden temp file next to `path` with a random suffix, so that two
/// concurrent writers never share a temp file.
fn temp_sibling(path: &Path) -> PathBuf {
    let random_suffix = fastrand::u64(..);
    let file_name = path
        .file_name()
        .map_or_else(|| "file".to_string(), |n| n.to_string_lossy().to_string());

    path.with_file_name(format!(".{file_name}.{random_suffix:016x}.tmp"))
}
