//! Test fixtures with LIFO clean-up.
//!
//! ```
//! use testy::fixture::Fixture;
//!
//! let fixture = Fixture::default();
//! let dir = fixture.temporary_directory().unwrap();
//! let seen = dir.clone();
//! // Runs before the directory is removed
//! fixture.defer(move || assert!(seen.is_dir()));
//! assert!(dir.is_dir());
//! drop(fixture);
//! assert!(!dir.exists());
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::env::EnvironmentVariable;
use crate::error::Error;
use crate::temp_dir::TemporaryTestDirectory;

/// Runs a closure exactly once, when dropped.
pub struct DeferredCallback<F: FnOnce()> {
    callback: Option<F>,
}

impl<F: FnOnce()> DeferredCallback<F> {
    pub fn new(callback: F) -> Self {
        Self {
            callback: Some(callback),
        }
    }
}

impl<F: FnOnce()> Drop for DeferredCallback<F> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

/// Owns resources registered during a test and drops them in reverse registration order,
/// either on [`Fixture::clean_up`] or when the fixture itself is dropped.
#[derive(Default)]
pub struct Fixture {
    resources: Mutex<Vec<Box<dyn Send>>>,
}

impl Fixture {
    /// Keeps `resource` alive until clean-up.
    pub fn using<T: Send + 'static>(&self, resource: T) {
        self.resources().push(Box::new(resource));
    }

    /// Runs `callback` on clean-up.
    pub fn defer(&self, callback: impl FnOnce() + Send + 'static) {
        self.using(DeferredCallback::new(callback));
    }

    /// Creates a temporary directory that is removed on clean-up.
    pub fn temporary_directory(&self) -> Result<PathBuf, Error> {
        let dir = TemporaryTestDirectory::new()?;
        let path = dir.path().to_path_buf();
        self.using(dir);
        Ok(path)
    }

    /// Sets an environment variable that is restored on clean-up.
    pub fn set_env_var(
        &self,
        name: impl Into<String>,
        value: impl Into<OsString>,
    ) -> Result<(), Error> {
        self.using(EnvironmentVariable::new(name, value)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.resources().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources().is_empty()
    }

    /// Drops every registered resource, last registered first.
    /// Resources registered while cleaning up are dropped too.
    pub fn clean_up(&self) {
        loop {
            // Release the lock before dropping, clean-up code may register more resources
            let resources = std::mem::take(&mut *self.resources());
            if resources.is_empty() {
                break;
            }
            tracing::debug!("Cleaning up {} fixture resources", resources.len());
            for resource in resources.into_iter().rev() {
                drop(resource);
            }
        }
    }

    fn resources(&self) -> MutexGuard<'_, Vec<Box<dyn Send>>> {
        // A panicking test must not prevent clean-up
        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        self.clean_up();
    }
}
