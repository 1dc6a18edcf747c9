use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A candidate file loaded for rewriting.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path to the file
    pub absolute_path: PathBuf,

    /// Relative path from the root directory
    pub relative_path: String,

    /// Decoded file content
    pub content: String,
}

impl FileEntry {
    /// Creates a new file entry.
    #[must_use]
    pub const fn new(absolute_path: PathBuf, relative_path: String, content: String) -> Self {
        Self {
            absolute_path,
            relative_path,
            content,
        }
    }

    /// Reads `path` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUtf8`] if the bytes are not valid UTF-8 and
    /// [`Error::Io`] for any other read failure.
    pub fn load(path: &Path, root: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::InvalidData {
                Error::invalid_utf8(path)
            } else {
                Error::io(path, e)
            }
        })?;

        Ok(Self::new(
            path.to_path_buf(),
            relative_path(path, root),
            content,
        ))
    }

    /// Returns the size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Returns `path` relative to `root` for display, falling back to `path`.
#[must_use]
pub(crate) fn relative_path(path: &Path, root: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}
