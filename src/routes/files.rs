//! Serving-directory access for `/files/{name}`
//!
//! Names are joined onto the root exactly as they appear in the request path.
//! There is no traversal sanitization: `..` segments and absolute names
//! escape the root. Concurrent writes to the same name race and the last
//! writer wins.

use std::io::ErrorKind;
use std::path::PathBuf;

/// Read-only handle on the directory files are served from.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Reads a whole file.
    ///
    /// Returns `Ok(None)` when there is no regular file by that name.
    pub async fn read(&self, name: &str) -> std::io::Result<Option<Vec<u8>>> {
        let path = self.path_for(name);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if !meta.is_file() => return Ok(None),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Ok(None);
            }
            Err(e) => return Err(e),
            Ok(_) => {}
        }

        match tokio::fs::read(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Creates or truncates `name` and writes `contents` to it.
    ///
    /// Parent directories are not created.
    pub async fn write(&self, name: &str, contents: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(self.path_for(name), contents).await
    }
}
