//! Bidirectional word↔document bookkeeping.
//!
//! The [`TokenStore`] is the ground truth every index structure must stay
//! consistent with: it maps each word to the set of documents containing
//! it and each document to the set of words it contains. After every
//! mutation the two maps satisfy
//!
//! ```text
//! d ∈ word_to_documents[w]  ⟺  w ∈ document_to_words[d]
//! ```
//!
//! Words are normalized to lowercase on the way in; the structures built
//! on top of the store only ever see normalized vocabulary.

use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LexicaError, Result};

/// Reserved separator used when concatenating vocabulary for the suffix
/// structure. Guaranteed absent from indexed words by [`TokenStore`]
/// validation.
pub const WORD_SEPARATOR: char = '\u{0}';

/// Set of document identifiers.
pub type DocumentSet = AHashSet<String>;

/// Set of normalized words.
pub type WordSet = AHashSet<String>;

/// Read-only statistics derived from a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStatistics {
    /// Number of distinct words in the vocabulary.
    pub word_count: usize,
    /// Number of documents with at least one indexed word.
    pub document_count: usize,
    /// Total (word, document) pairs across the whole store.
    pub total_occurrences: usize,
    /// When the store was created.
    pub created_at: DateTime<Utc>,
}

/// Bidirectional mapping between words and document identifiers.
#[derive(Debug, Clone)]
pub struct TokenStore {
    word_to_documents: AHashMap<String, DocumentSet>,
    document_to_words: AHashMap<String, WordSet>,
    created_at: DateTime<Utc>,
}

impl TokenStore {
    /// Create a new empty store, timestamped now.
    pub fn new() -> Self {
        TokenStore {
            word_to_documents: AHashMap::new(),
            document_to_words: AHashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Normalize a raw token to its stored form.
    ///
    /// Lowercases the token and rejects empty words and words containing
    /// the reserved separator.
    pub fn normalize_word(word: &str) -> Result<String> {
        if word.is_empty() {
            return Err(LexicaError::invalid_word("word must not be empty"));
        }
        if word.contains(WORD_SEPARATOR) {
            return Err(LexicaError::invalid_word(
                "word must not contain the reserved separator",
            ));
        }
        Ok(word.to_lowercase())
    }

    /// Add a (word, document) pair to both maps.
    ///
    /// Idempotent: repeated calls are no-ops beyond set insertion. Returns
    /// `true` when the word was not previously in the vocabulary.
    pub fn add(&mut self, word: &str, document_id: &str) -> Result<bool> {
        let word = Self::normalize_word(word)?;
        let new_word = !self.word_to_documents.contains_key(&word);

        self.word_to_documents
            .entry(word.clone())
            .or_default()
            .insert(document_id.to_string());
        self.document_to_words
            .entry(document_id.to_string())
            .or_default()
            .insert(word);

        Ok(new_word)
    }

    /// Remove a word from the vocabulary and from every document's word
    /// set. Returns whether the word existed. Documents left with an
    /// empty word set are kept.
    pub fn remove_word(&mut self, word: &str) -> bool {
        let word = word.to_lowercase();
        let Some(documents) = self.word_to_documents.remove(&word) else {
            return false;
        };
        for document_id in &documents {
            if let Some(words) = self.document_to_words.get_mut(document_id) {
                words.remove(&word);
            }
        }
        true
    }

    /// Whether the word is in the vocabulary.
    pub fn contains_word(&self, word: &str) -> bool {
        self.word_to_documents.contains_key(&word.to_lowercase())
    }

    /// Documents containing the word. Empty set for unknown words.
    pub fn documents_for(&self, word: &str) -> DocumentSet {
        self.word_to_documents
            .get(&word.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Borrow the document set for an already-normalized word.
    pub fn documents_for_normalized(&self, word: &str) -> Option<&DocumentSet> {
        self.word_to_documents.get(word)
    }

    /// Words contained in the document. Empty set for unknown documents.
    pub fn words_for(&self, document_id: &str) -> WordSet {
        self.document_to_words
            .get(document_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of distinct words in the document, zero if unknown.
    pub fn word_count_for(&self, document_id: &str) -> usize {
        self.document_to_words
            .get(document_id)
            .map_or(0, |words| words.len())
    }

    /// All vocabulary words, sorted.
    pub fn words(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.word_to_documents.keys().map(|w| w.as_str()).collect();
        words.sort_unstable();
        words
    }

    /// All known document identifiers, in no particular order.
    pub fn document_ids(&self) -> Vec<String> {
        self.document_to_words.keys().cloned().collect()
    }

    /// Number of distinct words.
    pub fn word_count(&self) -> usize {
        self.word_to_documents.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.word_to_documents.is_empty()
    }

    /// The word→documents map.
    pub fn word_to_documents(&self) -> &AHashMap<String, DocumentSet> {
        &self.word_to_documents
    }

    /// The document→words map.
    pub fn document_to_words(&self) -> &AHashMap<String, WordSet> {
        &self.document_to_words
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Derive statistics from the current contents.
    pub fn statistics(&self) -> IndexStatistics {
        IndexStatistics {
            word_count: self.word_to_documents.len(),
            document_count: self.document_to_words.len(),
            total_occurrences: self.word_to_documents.values().map(|d| d.len()).sum(),
            created_at: self.created_at,
        }
    }

    /// Reassemble a store from its two maps, e.g. when restoring a
    /// snapshot. The caller is responsible for having validated the
    /// bidirectional invariant first.
    pub fn from_parts(
        word_to_documents: AHashMap<String, DocumentSet>,
        document_to_words: AHashMap<String, WordSet>,
        created_at: DateTime<Utc>,
    ) -> Self {
        TokenStore {
            word_to_documents,
            document_to_words,
            created_at,
        }
    }

    /// Check the bidirectional invariant; used by tests and snapshot
    /// validation.
    pub fn is_consistent(&self) -> bool {
        let forward = self.word_to_documents.iter().all(|(word, documents)| {
            documents.iter().all(|document_id| {
                self.document_to_words
                    .get(document_id)
                    .is_some_and(|words| words.contains(word))
            })
        });
        let backward = self.document_to_words.iter().all(|(document_id, words)| {
            words.iter().all(|word| {
                self.word_to_documents
                    .get(word)
                    .is_some_and(|documents| documents.contains(document_id))
            })
        });
        forward && backward
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut store = TokenStore::new();
        assert!(store.add("Python", "d1").unwrap());
        assert!(!store.add("python", "d2").unwrap());

        let documents = store.documents_for("PYTHON");
        assert_eq!(documents.len(), 2);
        assert!(documents.contains("d1"));
        assert!(documents.contains("d2"));

        let words = store.words_for("d1");
        assert!(words.contains("python"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut store = TokenStore::new();
        store.add("rust", "d1").unwrap();
        store.add("rust", "d1").unwrap();

        assert_eq!(store.documents_for("rust").len(), 1);
        assert_eq!(store.statistics().total_occurrences, 1);
    }

    #[test]
    fn test_empty_word_rejected() {
        let mut store = TokenStore::new();
        let result = store.add("", "d1");
        assert!(matches!(result, Err(LexicaError::InvalidWord(_))));
    }

    #[test]
    fn test_separator_rejected() {
        let mut store = TokenStore::new();
        let word = format!("foo{WORD_SEPARATOR}bar");
        assert!(store.add(&word, "d1").is_err());
    }

    #[test]
    fn test_remove_word() {
        let mut store = TokenStore::new();
        store.add("java", "d1").unwrap();
        store.add("java", "d2").unwrap();
        store.add("kotlin", "d1").unwrap();

        assert!(store.remove_word("JAVA"));
        assert!(!store.remove_word("java"));

        assert!(store.documents_for("java").is_empty());
        assert!(!store.words_for("d1").contains("java"));
        assert!(store.words_for("d1").contains("kotlin"));
        // d2 is left behind with an empty word set.
        assert_eq!(store.word_count_for("d2"), 0);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_unknown_lookups_are_empty() {
        let store = TokenStore::new();
        assert!(store.documents_for("missing").is_empty());
        assert!(store.words_for("missing").is_empty());
    }

    #[test]
    fn test_consistency_after_mutations() {
        let mut store = TokenStore::new();
        for (word, document) in [
            ("alpha", "d1"),
            ("beta", "d1"),
            ("alpha", "d2"),
            ("gamma", "d3"),
        ] {
            store.add(word, document).unwrap();
        }
        store.remove_word("alpha");
        store.add("delta", "d2").unwrap();

        assert!(store.is_consistent());
    }

    #[test]
    fn test_statistics() {
        let mut store = TokenStore::new();
        store.add("uno", "d1").unwrap();
        store.add("dos", "d1").unwrap();
        store.add("uno", "d2").unwrap();

        let stats = store.statistics();
        assert_eq!(stats.word_count, 2);
        assert_eq!(stats.document_count, 2);
        assert_eq!(stats.total_occurrences, 3);
    }

    #[test]
    fn test_words_sorted() {
        let mut store = TokenStore::new();
        store.add("zeta", "d1").unwrap();
        store.add("alfa", "d1").unwrap();
        store.add("mu", "d1").unwrap();

        assert_eq!(store.words(), vec!["alfa", "mu", "zeta"]);
    }
}
