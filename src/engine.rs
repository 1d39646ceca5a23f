//! Owned, swappable published indexes.
//!
//! [`SearchEngine`] holds one slot per [`IndexKind`]. A build is a
//! long-running batch operation: the new index is constructed entirely
//! outside the lock, then published by swapping the slot under a write
//! lock — readers in flight finish against the old instance, new readers
//! see the new one. `add_word`/`remove_word` mutate the published
//! instance under the same write lock, so writers serialize with each
//! other and with a concurrent swap, while reads proceed concurrently
//! with reads. A build that fails between document insertions only
//! discards the instance being assembled; the published index is never
//! touched.

use log::{debug, info};
use parking_lot::RwLock;

use crate::error::{LexicaError, Result};
use crate::index::{Index, IndexKind, SearchHit};
use crate::snapshot::IndexSnapshot;
use crate::structure::{StructureLimits, StructureNode};
use crate::token_store::{DocumentSet, IndexStatistics};

/// Session-scoped owner of the published indexes.
pub struct SearchEngine {
    patricia: RwLock<Option<Index>>,
    suffix: RwLock<Option<Index>>,
}

impl SearchEngine {
    /// Create an engine with no published indexes.
    pub fn new() -> Self {
        SearchEngine {
            patricia: RwLock::new(None),
            suffix: RwLock::new(None),
        }
    }

    fn slot(&self, kind: IndexKind) -> &RwLock<Option<Index>> {
        match kind {
            IndexKind::Patricia => &self.patricia,
            IndexKind::Suffix => &self.suffix,
        }
    }

    fn not_built(kind: IndexKind) -> LexicaError {
        LexicaError::not_built(format!("no {kind} index has been built"))
    }

    /// Build an index from `(document_id, words)` pairs and publish it,
    /// replacing any previously published index of the same kind. The
    /// previous index keeps serving queries until the swap.
    pub fn build<I, D, W, T>(&self, kind: IndexKind, documents: I) -> Result<IndexStatistics>
    where
        I: IntoIterator<Item = (D, W)>,
        D: AsRef<str>,
        W: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let index = Index::build(kind, documents)?;
        let statistics = index.statistics();
        info!(
            "publishing {kind} index: {} words, {} documents",
            statistics.word_count, statistics.document_count
        );
        *self.slot(kind).write() = Some(index);
        Ok(statistics)
    }

    /// Whether an index of the kind has been published.
    pub fn is_built(&self, kind: IndexKind) -> bool {
        self.slot(kind).read().is_some()
    }

    /// Drop the published index of the kind, if any.
    pub fn drop_index(&self, kind: IndexKind) -> bool {
        self.slot(kind).write().take().is_some()
    }

    /// Search the published index: matched documents with matched words
    /// and relevance scores.
    pub fn search(&self, kind: IndexKind, query: &str) -> Result<Vec<SearchHit>> {
        let guard = self.slot(kind).read();
        let index = guard.as_ref().ok_or_else(|| Self::not_built(kind))?;
        index.search(query)
    }

    /// Search the published index for the matching document set only.
    pub fn search_documents(&self, kind: IndexKind, query: &str) -> Result<DocumentSet> {
        let guard = self.slot(kind).read();
        let index = guard.as_ref().ok_or_else(|| Self::not_built(kind))?;
        index.search_documents(query)
    }

    /// Add a word to the published index. With a document id the word is
    /// attached to that document; without one it is attached to every
    /// document the index already knows.
    pub fn add_word(&self, kind: IndexKind, word: &str, document_id: Option<&str>) -> Result<()> {
        let mut guard = self.slot(kind).write();
        let index = guard.as_mut().ok_or_else(|| Self::not_built(kind))?;
        match document_id {
            Some(document_id) => index.add_word(word, document_id)?,
            None => {
                let document_ids = index.store().document_ids();
                debug!("adding word {word:?} to all {} documents", document_ids.len());
                for document_id in document_ids {
                    index.add_word(word, &document_id)?;
                }
            }
        }
        Ok(())
    }

    /// Remove a word from the published index. Returns whether it
    /// existed.
    pub fn remove_word(&self, kind: IndexKind, word: &str) -> Result<bool> {
        let mut guard = self.slot(kind).write();
        let index = guard.as_mut().ok_or_else(|| Self::not_built(kind))?;
        Ok(index.remove_word(word))
    }

    /// Statistics of the published index.
    pub fn statistics(&self, kind: IndexKind) -> Result<IndexStatistics> {
        let guard = self.slot(kind).read();
        let index = guard.as_ref().ok_or_else(|| Self::not_built(kind))?;
        Ok(index.statistics())
    }

    /// Full structural export of the published index.
    pub fn to_structure_tree(&self, kind: IndexKind) -> Result<StructureNode> {
        let guard = self.slot(kind).read();
        let index = guard.as_ref().ok_or_else(|| Self::not_built(kind))?;
        Ok(index.to_structure_tree())
    }

    /// Bounded structural export; elisions are marked `truncated: true`.
    pub fn to_structure_tree_bounded(
        &self,
        kind: IndexKind,
        limits: &StructureLimits,
    ) -> Result<StructureNode> {
        let guard = self.slot(kind).read();
        let index = guard.as_ref().ok_or_else(|| Self::not_built(kind))?;
        Ok(index.to_structure_tree_bounded(limits))
    }

    /// Capture a snapshot of the published index for persistence.
    pub fn snapshot(&self, kind: IndexKind) -> Result<IndexSnapshot> {
        let guard = self.slot(kind).read();
        let index = guard.as_ref().ok_or_else(|| Self::not_built(kind))?;
        Ok(IndexSnapshot::capture(index))
    }

    /// Restore a snapshot and publish the rebuilt index in its kind's
    /// slot.
    pub fn restore(&self, snapshot: &IndexSnapshot) -> Result<IndexStatistics> {
        let index = snapshot.restore()?;
        let statistics = index.statistics();
        info!(
            "publishing restored {} index: {} words, {} documents",
            snapshot.kind, statistics.word_count, statistics.document_count
        );
        *self.slot(snapshot.kind).write() = Some(index);
        Ok(statistics)
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<(&'static str, Vec<&'static str>)> {
        vec![
            ("d1", vec!["python", "lenguaje"]),
            ("d2", vec!["java", "python"]),
        ]
    }

    #[test]
    fn test_query_before_build_fails() {
        let engine = SearchEngine::new();
        assert!(matches!(
            engine.search(IndexKind::Patricia, "py"),
            Err(LexicaError::IndexNotBuilt(_))
        ));
        assert!(matches!(
            engine.remove_word(IndexKind::Suffix, "python"),
            Err(LexicaError::IndexNotBuilt(_))
        ));
    }

    #[test]
    fn test_build_and_search() {
        let engine = SearchEngine::new();
        let stats = engine.build(IndexKind::Suffix, corpus()).unwrap();
        assert_eq!(stats.word_count, 3);
        assert_eq!(stats.document_count, 2);

        let documents = engine.search_documents(IndexKind::Suffix, "thon").unwrap();
        assert_eq!(documents.len(), 2);
    }

    #[test]
    fn test_kinds_are_independent() {
        let engine = SearchEngine::new();
        engine.build(IndexKind::Patricia, corpus()).unwrap();

        assert!(engine.is_built(IndexKind::Patricia));
        assert!(!engine.is_built(IndexKind::Suffix));
        assert!(engine.search(IndexKind::Suffix, "thon").is_err());
    }

    #[test]
    fn test_failed_build_leaves_published_index_untouched() {
        let engine = SearchEngine::new();
        engine.build(IndexKind::Patricia, corpus()).unwrap();

        let empty: Vec<(&str, Vec<&str>)> = Vec::new();
        assert!(engine.build(IndexKind::Patricia, empty).is_err());

        // A build failing mid-stream (invalid word) is also discarded.
        let bad = vec![("d3", vec!["ok"]), ("d4", vec![""])];
        assert!(engine.build(IndexKind::Patricia, bad).is_err());

        let documents = engine.search_documents(IndexKind::Patricia, "python").unwrap();
        assert_eq!(documents.len(), 2);
        assert!(engine.search_documents(IndexKind::Patricia, "ok").unwrap().is_empty());
    }

    #[test]
    fn test_rebuild_replaces_published_index() {
        let engine = SearchEngine::new();
        engine.build(IndexKind::Patricia, corpus()).unwrap();
        engine
            .build(IndexKind::Patricia, vec![("d9", vec!["rust"])])
            .unwrap();

        assert!(engine.search_documents(IndexKind::Patricia, "python").unwrap().is_empty());
        assert!(engine.search_documents(IndexKind::Patricia, "ru").unwrap().contains("d9"));
    }

    #[test]
    fn test_add_word_with_and_without_document() {
        let engine = SearchEngine::new();
        engine.build(IndexKind::Suffix, corpus()).unwrap();

        engine.add_word(IndexKind::Suffix, "nuevo", Some("d1")).unwrap();
        assert_eq!(
            engine.search_documents(IndexKind::Suffix, "uevo").unwrap().len(),
            1
        );

        engine.add_word(IndexKind::Suffix, "global", None).unwrap();
        assert_eq!(
            engine.search_documents(IndexKind::Suffix, "global").unwrap().len(),
            2
        );
    }

    #[test]
    fn test_remove_word() {
        let engine = SearchEngine::new();
        engine.build(IndexKind::Patricia, corpus()).unwrap();

        assert!(engine.remove_word(IndexKind::Patricia, "python").unwrap());
        assert!(!engine.remove_word(IndexKind::Patricia, "python").unwrap());
        assert!(engine.search_documents(IndexKind::Patricia, "py").unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_restore_through_engine() {
        let engine = SearchEngine::new();
        engine.build(IndexKind::Suffix, corpus()).unwrap();
        let snapshot = engine.snapshot(IndexKind::Suffix).unwrap();

        let other = SearchEngine::new();
        other.restore(&snapshot).unwrap();
        assert_eq!(
            other.search_documents(IndexKind::Suffix, "thon").unwrap(),
            engine.search_documents(IndexKind::Suffix, "thon").unwrap()
        );
    }

    #[test]
    fn test_drop_index() {
        let engine = SearchEngine::new();
        engine.build(IndexKind::Patricia, corpus()).unwrap();
        assert!(engine.drop_index(IndexKind::Patricia));
        assert!(!engine.drop_index(IndexKind::Patricia));
        assert!(!engine.is_built(IndexKind::Patricia));
    }
}
