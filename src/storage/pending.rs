//! Listing ids waiting for a "contact" callback.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared `listing id -> normalized link` map.
///
/// Written by the notifier, read by the callback handler. Clones share the
/// same map. Entries live for the whole process and are not persisted, so a
/// restart forgets them.
#[derive(Debug, Clone, Default)]
pub struct PendingActions {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the link for a listing id, replacing any previous entry.
    pub fn register(&self, id: &str, link: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), link.to_string());
    }

    pub fn resolve(&self, id: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
