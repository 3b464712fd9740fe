use std::io;
use std::path::Path;

/// The file operations `ConfigManager` needs, so tests can swap in an
/// in-memory store.
pub trait FileSystem {
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or not UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replaces `path` with `contents`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_all(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem. Writes go through [`atomic_write_sync`] so a failed
/// save never truncates `config.toml`.
///
/// [`atomic_write_sync`]: crate::atomic::atomic_write_sync
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_all(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        crate::atomic::atomic_write_sync(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
