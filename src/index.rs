//! Unified interface over the two index structures.
//!
//! [`IndexKind`] selects a structure explicitly; [`Index`] is the tagged
//! variant dispatching to [`PatriciaIndex`] or [`SuffixIndex`], both of
//! which share the [`TokenStore`] contract. Query semantics differ by
//! kind: the trie answers exact and prefix matches, the suffix structure
//! answers substring matches.

use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{LexicaError, Result};
use crate::patricia::PatriciaIndex;
use crate::structure::{StructureLimits, StructureNode};
use crate::suffix::SuffixIndex;
use crate::token_store::{DocumentSet, IndexStatistics, TokenStore, WordSet};

/// The available index structure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Compressed prefix trie: exact and prefix queries.
    Patricia,
    /// Generalized suffix structure: substring queries.
    Suffix,
}

impl IndexKind {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Patricia => "patricia",
            IndexKind::Suffix => "suffix",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexKind {
    type Err = LexicaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "patricia" => Ok(IndexKind::Patricia),
            "suffix" => Ok(IndexKind::Suffix),
            other => Err(LexicaError::unsupported_index_type(other)),
        }
    }
}

/// One matched document with the words that matched and a relevance
/// score: matched words over total distinct words in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Matched document identifier.
    pub document_id: String,
    /// Matched vocabulary words present in this document, sorted.
    pub matched_words: Vec<String>,
    /// matched_words / total distinct words in the document.
    pub score: f64,
}

/// A built index of either kind.
#[derive(Debug, Clone)]
pub enum Index {
    Patricia(PatriciaIndex),
    Suffix(SuffixIndex),
}

impl Index {
    /// Create an empty index of the given kind.
    pub fn empty(kind: IndexKind) -> Self {
        match kind {
            IndexKind::Patricia => Index::Patricia(PatriciaIndex::new()),
            IndexKind::Suffix => Index::Suffix(SuffixIndex::new()),
        }
    }

    /// Build an index from a stream of `(document_id, words)` pairs.
    /// An empty stream is a failed build.
    pub fn build<I, D, W, T>(kind: IndexKind, documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = (D, W)>,
        D: AsRef<str>,
        W: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut index = Index::empty(kind);
        let mut document_count = 0usize;
        for (document_id, words) in documents {
            index.add_document(document_id.as_ref(), words)?;
            document_count += 1;
        }
        if document_count == 0 {
            return Err(LexicaError::index(
                "cannot build an index from an empty document set",
            ));
        }
        Ok(index)
    }

    /// Rebuild an index of the given kind from restored bookkeeping.
    pub fn from_store(kind: IndexKind, store: TokenStore) -> Self {
        match kind {
            IndexKind::Patricia => Index::Patricia(PatriciaIndex::from_store(store)),
            IndexKind::Suffix => Index::Suffix(SuffixIndex::from_store(store)),
        }
    }

    /// This index's kind.
    pub fn kind(&self) -> IndexKind {
        match self {
            Index::Patricia(_) => IndexKind::Patricia,
            Index::Suffix(_) => IndexKind::Suffix,
        }
    }

    /// The shared bookkeeping backing this index.
    pub fn store(&self) -> &TokenStore {
        match self {
            Index::Patricia(index) => index.store(),
            Index::Suffix(index) => index.store(),
        }
    }

    /// Insert every word of a tokenized document.
    pub fn add_document<I, T>(&mut self, document_id: &str, words: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        match self {
            Index::Patricia(index) => index.add_document(document_id, words),
            Index::Suffix(index) => index.add_document(document_id, words),
        }
    }

    /// Insert a single word for a document.
    pub fn add_word(&mut self, word: &str, document_id: &str) -> Result<()> {
        match self {
            Index::Patricia(index) => index.insert(word, document_id),
            Index::Suffix(index) => index.insert(word, document_id),
        }
    }

    /// Remove a word from the index. Returns whether it existed.
    pub fn remove_word(&mut self, word: &str) -> bool {
        match self {
            Index::Patricia(index) => index.remove_word(word),
            Index::Suffix(index) => index.remove_word(word),
        }
    }

    /// Vocabulary words matching the query under this index's semantics:
    /// exact-or-prefix for the trie, substring for the suffix structure.
    pub fn matching_words(&self, query: &str) -> Result<WordSet> {
        match self {
            Index::Patricia(index) => {
                if query.is_empty() {
                    return Err(LexicaError::invalid_query("query must not be empty"));
                }
                Ok(index.prefix(query).into_iter().collect())
            }
            Index::Suffix(index) => index.matching_words(query),
        }
    }

    /// The set of documents matching the query.
    pub fn search_documents(&self, query: &str) -> Result<DocumentSet> {
        let store = self.store();
        let mut documents = DocumentSet::default();
        for word in self.matching_words(query)? {
            if let Some(word_documents) = store.documents_for_normalized(&word) {
                documents.extend(word_documents.iter().cloned());
            }
        }
        Ok(documents)
    }

    /// Matched documents with per-document matched words and relevance
    /// scores, best score first (ties broken by document id).
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let store = self.store();
        let mut per_document: AHashMap<String, Vec<String>> = AHashMap::new();
        for word in self.matching_words(query)? {
            if let Some(word_documents) = store.documents_for_normalized(&word) {
                for document_id in word_documents {
                    per_document
                        .entry(document_id.clone())
                        .or_default()
                        .push(word.clone());
                }
            }
        }

        let mut hits: Vec<SearchHit> = per_document
            .into_iter()
            .map(|(document_id, mut matched_words)| {
                matched_words.sort_unstable();
                let total = store.word_count_for(&document_id).max(1);
                let score = matched_words.len() as f64 / total as f64;
                SearchHit {
                    document_id,
                    matched_words,
                    score,
                }
            })
            .collect();
        hits.sort_unstable_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        Ok(hits)
    }

    /// Index statistics.
    pub fn statistics(&self) -> IndexStatistics {
        self.store().statistics()
    }

    /// Full structural export of the underlying structure.
    pub fn to_structure_tree(&self) -> StructureNode {
        match self {
            Index::Patricia(index) => index.to_structure_tree(),
            Index::Suffix(index) => index.to_structure_tree(),
        }
    }

    /// Bounded structural export; elided nodes carry `truncated: true`.
    pub fn to_structure_tree_bounded(&self, limits: &StructureLimits) -> StructureNode {
        self.to_structure_tree().bounded(limits)
    }
}
