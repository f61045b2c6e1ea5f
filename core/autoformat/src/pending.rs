//! Documents waiting to be reformatted, keyed by identity.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::document::DocumentId;

#[derive(Debug, Clone, Default)]
pub struct PendingSet {
    entries: HashMap<DocumentId, DateTime<Utc>>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a save; a later save of the same document replaces the timestamp.
    pub fn record_save(&mut self, document: DocumentId, saved_at: DateTime<Utc>) {
        self.entries.insert(document, saved_at);
    }

    pub fn remove(&mut self, document: &DocumentId) -> bool {
        self.entries.remove(document).is_some()
    }

    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, document: &DocumentId) -> bool {
        self.entries.contains_key(document)
    }

    pub fn saved_at(&self, document: &DocumentId) -> Option<DateTime<Utc>> {
        self.entries.get(document).copied()
    }

    /// Drops every entry matching `discard` and returns the dropped documents.
    pub fn discard_where<F>(&mut self, mut discard: F) -> Vec<DocumentId>
    where
        F: FnMut(&DocumentId) -> bool,
    {
        let doomed: Vec<DocumentId> = self
            .entries
            .keys()
            .filter(|document| discard(*document))
            .cloned()
            .collect();
        for document in &doomed {
            self.entries.remove(document);
        }
        doomed
    }

    /// True when some save happened less than `window` before `now`.
    pub fn any_younger_than(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.entries
            .values()
            .any(|saved_at| now.signed_duration_since(*saved_at) < window)
    }

    /// Empties the set, returning its documents oldest save first.
    pub fn drain_oldest_first(&mut self) -> Vec<DocumentId> {
        let mut entries: Vec<(DocumentId, DateTime<Utc>)> = self.entries.drain().collect();
        entries.sort_by(|(left_doc, left_at), (right_doc, right_at)| {
            left_at.cmp(right_at).then_with(|| left_doc.cmp(right_doc))
        });
        entries.into_iter().map(|(document, _)| document).collect()
    }
}
