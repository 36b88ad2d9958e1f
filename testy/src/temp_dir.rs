use std::fmt::{self, Display};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, ErrorDetails};

const PREFIX: &str = "testdirectory-";

static RESERVED: AtomicUsize = AtomicUsize::new(0);

/// A uniquely named `testdirectory-*` directory, removed recursively on drop.
///
/// ```
/// use testy::temp_dir::TemporaryTestDirectory;
///
/// let dir = TemporaryTestDirectory::new().unwrap();
/// std::fs::write(dir.join("data.json"), "{}").unwrap();
/// let path = dir.path().to_path_buf();
/// drop(dir);
/// assert!(!path.exists());
/// ```
#[derive(Debug)]
pub struct TemporaryTestDirectory {
    path: PathBuf,
}

impl TemporaryTestDirectory {
    /// Creates the directory under the system temp directory.
    pub fn new() -> Result<Self, Error> {
        Self::in_root(std::env::temp_dir())
    }

    /// Creates the directory under `root`.
    pub fn in_root(root: impl AsRef<Path>) -> Result<Self, Error> {
        let root = root.as_ref();
        let dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(root)
            .map_err(|e| {
                Error::new(ErrorDetails::Io {
                    message: format!(
                        "Failed to create temporary directory in `{}`: {e}",
                        root.display()
                    ),
                })
            })?;
        // Removal is ours, so that it gets logged
        let path = dir.keep();
        tracing::debug!("Created temporary directory `{}`", path.display());
        Ok(Self { path })
    }

    /// Picks a unique path under `root` without creating anything.
    /// Whatever the test creates at that path is removed on drop.
    pub fn reserve(root: impl AsRef<Path>) -> Self {
        let sequence = RESERVED.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "{PREFIX}{}-{sequence}-{:08x}",
            std::process::id(),
            rand::random::<u32>()
        );
        let path = root.as_ref().join(name);
        tracing::debug!("Reserved temporary directory `{}`", path.display());
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Deref for TemporaryTestDirectory {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for TemporaryTestDirectory {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Display for TemporaryTestDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl Drop for TemporaryTestDirectory {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!("Deleted temporary directory `{}`", self.path.display()),
            Err(e) => tracing::warn!(
                "Failed to delete temporary directory `{}`: {e}",
                self.path.display()
            ),
        }
    }
}
