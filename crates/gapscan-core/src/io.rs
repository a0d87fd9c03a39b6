use crate::error::{GapscanError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Maximum size of any single file read by the engine. Inherited from the
/// shared file-safety limit used by collaborating tools.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents a crashed run from truncating the progress sidecar.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Read a file to string, refusing anything over [`MAX_FILE_SIZE`].
pub fn read_bounded(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_FILE_SIZE {
        return Err(GapscanError::FileTooLarge {
            path: path.display().to_string(),
            size: meta.len(),
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Directory names excluded from doc and code scans.
const SKIP_DIRS: &[&str] = &[
    ".git",
    "target",
    "node_modules",
    "dist",
    "build",
    "vendor",
    "__pycache__",
];

/// Walk predicate: skip VCS, build output, and hidden directories.
pub fn is_scannable_dir(name: &str) -> bool {
    if name.starts_with('.') && name != "." && name != ".." {
        return false;
    }
    !SKIP_DIRS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roadmap.progress.json");
        atomic_write(&path, b"{\"history\":[]}").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\"history\":[]}"
        );
    }

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/out.json");
        atomic_write(&path, b"{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn atomic_write_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.json");
        atomic_write(&path, b"old").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn read_bounded_small_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.md");
        std::fs::write(&path, "# hello").unwrap();
        assert_eq!(read_bounded(&path).unwrap(), "# hello");
    }

    #[test]
    fn skip_dirs() {
        assert!(!is_scannable_dir(".git"));
        assert!(!is_scannable_dir("node_modules"));
        assert!(!is_scannable_dir(".hidden"));
        assert!(is_scannable_dir("src"));
        assert!(is_scannable_dir("docs"));
    }
}
