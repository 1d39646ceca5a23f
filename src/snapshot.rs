//! Serialization of a built index to a self-contained record.
//!
//! An [`IndexSnapshot`] carries the two bookkeeping maps plus the index
//! kind and build timestamp; the structures themselves are rebuilt
//! deterministically from the vocabulary on restore, so the reconstructed
//! trie/suffix shape answers every query identically even though it need
//! not be byte-identical. Loading validates the bidirectional-map
//! invariant and fails loudly on an inconsistent record.

use std::collections::BTreeMap;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LexicaError, Result};
use crate::index::{Index, IndexKind};
use crate::token_store::{DocumentSet, TokenStore, WordSet};

/// A serializable record of a built index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Which structure the record was captured from.
    pub kind: IndexKind,
    /// Build timestamp of the captured index.
    pub created_at: DateTime<Utc>,
    /// word → sorted document ids.
    pub word_to_documents: BTreeMap<String, Vec<String>>,
    /// document id → sorted words.
    pub document_to_words: BTreeMap<String, Vec<String>>,
}

fn sorted_map(source: &AHashMap<String, ahash::AHashSet<String>>) -> BTreeMap<String, Vec<String>> {
    source
        .iter()
        .map(|(key, values)| {
            let mut values: Vec<String> = values.iter().cloned().collect();
            values.sort_unstable();
            (key.clone(), values)
        })
        .collect()
}

impl IndexSnapshot {
    /// Capture a snapshot of a built index. Output is deterministic:
    /// maps and value lists are sorted.
    pub fn capture(index: &Index) -> Self {
        let store = index.store();
        IndexSnapshot {
            kind: index.kind(),
            created_at: store.created_at(),
            word_to_documents: sorted_map(store.word_to_documents()),
            document_to_words: sorted_map(store.document_to_words()),
        }
    }

    /// Check internal consistency: non-empty words and the bidirectional
    /// invariant `d ∈ word_to_documents[w] ⟺ w ∈ document_to_words[d]`.
    pub fn validate(&self) -> Result<()> {
        for (word, documents) in &self.word_to_documents {
            if word.is_empty() {
                return Err(LexicaError::deserialization("record contains an empty word"));
            }
            for document_id in documents {
                let consistent = self
                    .document_to_words
                    .get(document_id)
                    .is_some_and(|words| words.contains(word));
                if !consistent {
                    return Err(LexicaError::deserialization(format!(
                        "word {word:?} lists document {document_id:?}, but the document does not list the word"
                    )));
                }
            }
        }
        for (document_id, words) in &self.document_to_words {
            for word in words {
                let consistent = self
                    .word_to_documents
                    .get(word)
                    .is_some_and(|documents| documents.contains(document_id));
                if !consistent {
                    return Err(LexicaError::deserialization(format!(
                        "document {document_id:?} lists word {word:?}, but the word does not list the document"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validate and rebuild a queryable index from the record.
    pub fn restore(&self) -> Result<Index> {
        self.validate()?;

        let mut word_to_documents: AHashMap<String, DocumentSet> = AHashMap::new();
        for (word, documents) in &self.word_to_documents {
            word_to_documents.insert(word.clone(), documents.iter().cloned().collect());
        }
        let mut document_to_words: AHashMap<String, WordSet> = AHashMap::new();
        for (document_id, words) in &self.document_to_words {
            document_to_words.insert(document_id.clone(), words.iter().cloned().collect());
        }

        let store = TokenStore::from_parts(word_to_documents, document_to_words, self.created_at);
        Ok(Index::from_store(self.kind, store))
    }

    /// Serialize to a JSON record for the caller's persistence sink.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a JSON record. Corrupt or inconsistent records
    /// fail with [`LexicaError::DeserializationError`].
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: IndexSnapshot = serde_json::from_str(json)
            .map_err(|e| LexicaError::deserialization(format!("invalid snapshot record: {e}")))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
