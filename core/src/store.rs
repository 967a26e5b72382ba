use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::debug;

use crate::analyze::diagnostic::Diagnostic;

/// Shared across stores so a closed-then-reopened document never reuses a revision.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Analysis request token; larger is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

impl Revision {
    fn next() -> Self {
        Revision(NEXT_REVISION.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct Entry {
    requested: Option<Revision>,
    published: Option<Revision>,
    diagnostics: Arc<Vec<Diagnostic>>,
}

/// Latest diagnostics snapshot per document.
///
/// Every analysis run starts with [`DiagnosticStore::begin`]; only the most recently begun run may
/// install its result, so a slow run that finishes after a newer edit is discarded.
#[derive(Debug)]
pub struct DiagnosticStore<K: Eq + Hash> {
    entries: DashMap<K, Entry>,
}

impl<K: Eq + Hash + Clone> Default for DiagnosticStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> DiagnosticStore<K> {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    pub fn begin(&self, doc: &K) -> Revision {
        let revision = Revision::next();
        self.entries.entry(doc.clone()).or_default().requested = Some(revision);
        revision
    }

    /// Whether `revision` is still the newest run for `doc`.
    pub fn is_current(&self, doc: &K, revision: Revision) -> bool {
        self.entries
            .get(doc)
            .is_some_and(|e| e.requested == Some(revision))
    }

    /// Replaces the snapshot when `revision` is current; returns whether it was installed.
    pub fn publish(&self, doc: &K, revision: Revision, diagnostics: Vec<Diagnostic>) -> bool {
        let Some(mut entry) = self.entries.get_mut(doc) else {
            debug!(revision = revision.get(), "dropping diagnostics for closed document");
            return false;
        };
        if entry.requested != Some(revision) {
            debug!(
                revision = revision.get(),
                latest = ?entry.requested.map(Revision::get),
                "dropping stale diagnostics"
            );
            return false;
        }
        entry.published = Some(revision);
        entry.diagnostics = Arc::new(diagnostics);
        true
    }

    pub fn snapshot(&self, doc: &K) -> Option<Arc<Vec<Diagnostic>>> {
        self.entries
            .get(doc)
            .filter(|e| e.published.is_some())
            .map(|e| e.diagnostics.clone())
    }

    pub fn published_revision(&self, doc: &K) -> Option<Revision> {
        self.entries.get(doc).and_then(|e| e.published)
    }

    pub fn clear(&self, doc: &K) {
        self.entries.remove(doc);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
