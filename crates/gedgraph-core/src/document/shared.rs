//! Thread-shareable document handle

use std::sync::{Arc, RwLock};

use crate::document::Document;
use crate::errors::{GedcomError, Result};

/// A `Document` behind `Arc<RwLock<_>>`
///
/// Readers run concurrently; writers are serialized, which also keeps the
/// single open transaction per document.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument {
    inner: Arc<RwLock<Document>>,
}

fn poisoned() -> GedcomError {
    GedcomError::Concurrency {
        message: "document lock poisoned by a panicking writer".to_string(),
    }
}

impl SharedDocument {
    pub fn new(document: Document) -> Self {
        Self {
            inner: Arc::new(RwLock::new(document)),
        }
    }

    /// Run `f` with shared access
    ///
    /// # Errors
    ///
    /// Returns `Concurrency` when the lock is poisoned.
    pub fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> Result<T> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(f(&guard))
    }

    /// Run `f` with exclusive access
    ///
    /// # Errors
    ///
    /// Returns `Concurrency` when the lock is poisoned.
    pub fn write<T>(&self, f: impl FnOnce(&mut Document) -> T) -> Result<T> {
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        Ok(f(&mut guard))
    }
}
