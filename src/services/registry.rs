//! Per-document diagnostic registry
//!
//! Each lint request takes a token from [`DiagnosticRegistry::begin`]. A
//! result is only published while its token is still the latest one issued
//! for that document, so a slow request cannot overwrite the findings of a
//! newer one. Closing a document drops its slot, which invalidates every
//! token still in flight for it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::models::diagnostic::Diagnostic;
use crate::models::document::DocumentId;

/// Identifies one lint request for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
struct Slot {
    latest: u64,
    diagnostics: Option<Vec<Diagnostic>>,
}

/// Diagnostics per document, guarded by request tokens
#[derive(Debug, Default)]
pub struct DiagnosticRegistry {
    next_token: AtomicU64,
    slots: Mutex<HashMap<DocumentId, Slot>>,
}

impl DiagnosticRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for a document; supersedes earlier tokens
    pub fn begin(&self, id: &DocumentId) -> RequestToken {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().entry(id.clone()).or_default().latest = token;
        RequestToken(token)
    }

    /// Replace the document's diagnostics if the token is still current
    pub fn publish(
        &self,
        id: &DocumentId,
        token: RequestToken,
        diagnostics: Vec<Diagnostic>,
    ) -> bool {
        let mut slots = self.lock();
        match slots.get_mut(id) {
            Some(slot) if slot.latest == token.0 => {
                tracing::trace!("Publishing {} diagnostics for {}", diagnostics.len(), id);
                slot.diagnostics = Some(diagnostics);
                true
            }
            _ => {
                tracing::debug!("Discarding stale lint result for {}", id);
                false
            }
        }
    }

    /// Clear the document's diagnostics after a failed request, if still current
    pub fn clear_current(&self, id: &DocumentId, token: RequestToken) -> bool {
        let mut slots = self.lock();
        match slots.get_mut(id) {
            Some(slot) if slot.latest == token.0 => {
                slot.diagnostics = None;
                true
            }
            _ => false,
        }
    }

    /// Remove the document's entry unconditionally
    pub fn remove(&self, id: &DocumentId) {
        self.lock().remove(id);
    }

    /// Remove every entry
    pub fn clear_all(&self) {
        self.lock().clear();
    }

    /// Published diagnostics for a document
    pub fn get(&self, id: &DocumentId) -> Option<Vec<Diagnostic>> {
        self.lock().get(id).and_then(|slot| slot.diagnostics.clone())
    }

    /// Whether the document has published diagnostics
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.lock()
            .get(id)
            .is_some_and(|slot| slot.diagnostics.is_some())
    }

    /// Number of documents with published diagnostics
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| slot.diagnostics.is_some())
            .count()
    }

    /// Whether no document has published diagnostics
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<DocumentId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
