//! Generalized suffix structure over the vocabulary for substring search.
//!
//! The distinct vocabulary is concatenated with a reserved separator and a
//! suffix array is built over the concatenation. A pattern query binary
//! searches the array for the run of suffixes starting with the pattern,
//! then maps each occurrence offset back to its enclosing word through the
//! word-boundary table (O(log n) per occurrence, never a linear scan).
//!
//! Mutation policy: adding a word that is new to the vocabulary, or
//! removing a word, rebuilds the suffix array from the updated
//! concatenation. That is O(total vocabulary length) per mutation and is
//! the wrong tool for high-churn workloads; incremental suffix-structure
//! construction is the upgrade path. Queries against a published index are
//! unaffected while a replacement is built elsewhere (see
//! [`crate::engine`]).

use log::debug;

use crate::error::{LexicaError, Result};
use crate::structure::StructureNode;
use crate::token_store::{DocumentSet, IndexStatistics, TokenStore, WORD_SEPARATOR, WordSet};

/// Substring word index backed by a suffix array and a [`TokenStore`].
#[derive(Debug, Clone)]
pub struct SuffixIndex {
    store: TokenStore,
    /// Vocabulary words in concatenation order (sorted).
    words: Vec<String>,
    /// The words joined by [`WORD_SEPARATOR`].
    text: String,
    /// Byte offset of each word's start in `text` (parallel to `words`).
    word_starts: Vec<usize>,
    /// Suffix start offsets, sorted by suffix content.
    suffix_array: Vec<usize>,
}

impl SuffixIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        SuffixIndex {
            store: TokenStore::new(),
            words: Vec::new(),
            text: String::new(),
            word_starts: Vec::new(),
            suffix_array: Vec::new(),
        }
    }

    /// Rebuild an index from existing bookkeeping, e.g. a restored
    /// snapshot.
    pub fn from_store(store: TokenStore) -> Self {
        let mut index = SuffixIndex {
            store,
            words: Vec::new(),
            text: String::new(),
            word_starts: Vec::new(),
            suffix_array: Vec::new(),
        };
        index.rebuild();
        index
    }

    /// Insert a word for a document. A word new to the vocabulary
    /// triggers a full rebuild of the suffix array.
    pub fn insert(&mut self, word: &str, document_id: &str) -> Result<()> {
        let word = TokenStore::normalize_word(word)?;
        let new_word = self.store.add(&word, document_id)?;
        if new_word {
            self.rebuild();
        }
        Ok(())
    }

    /// Insert every word of a tokenized document, rebuilding the suffix
    /// array once at the end if the vocabulary grew.
    pub fn add_document<I, W>(&mut self, document_id: &str, words: I) -> Result<()>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let mut vocabulary_grew = false;
        for word in words {
            let word = TokenStore::normalize_word(word.as_ref())?;
            vocabulary_grew |= self.store.add(&word, document_id)?;
        }
        if vocabulary_grew {
            self.rebuild();
        }
        Ok(())
    }

    /// Remove a word and rebuild the structure from the post-deletion
    /// vocabulary. Returns whether the word existed.
    pub fn remove_word(&mut self, word: &str) -> bool {
        if !self.store.remove_word(word) {
            return false;
        }
        self.rebuild();
        true
    }

    /// Alias for [`SuffixIndex::remove_word`], matching the structure
    /// mutation vocabulary of the trie index.
    pub fn delete(&mut self, word: &str) -> bool {
        self.remove_word(word)
    }

    fn rebuild(&mut self) {
        self.words = self.store.words().iter().map(|w| w.to_string()).collect();

        let mut text = String::new();
        let mut word_starts = Vec::with_capacity(self.words.len());
        for word in &self.words {
            word_starts.push(text.len());
            text.push_str(word);
            text.push(WORD_SEPARATOR);
        }

        let bytes = text.as_bytes();
        let mut suffix_array: Vec<usize> = (0..text.len())
            .filter(|&i| text.is_char_boundary(i) && bytes[i] != WORD_SEPARATOR as u8)
            .collect();
        suffix_array.sort_unstable_by(|&a, &b| bytes[a..].cmp(&bytes[b..]));

        debug!(
            "rebuilt suffix array: {} words, {} suffixes",
            self.words.len(),
            suffix_array.len()
        );

        self.text = text;
        self.word_starts = word_starts;
        self.suffix_array = suffix_array;
    }

    fn validate_pattern(pattern: &str) -> Result<String> {
        if pattern.is_empty() {
            return Err(LexicaError::invalid_query("pattern must not be empty"));
        }
        if pattern.contains(WORD_SEPARATOR) {
            return Err(LexicaError::invalid_query(
                "pattern must not contain the reserved separator",
            ));
        }
        Ok(pattern.to_lowercase())
    }

    /// Vocabulary words containing the pattern as a substring.
    pub fn matching_words(&self, pattern: &str) -> Result<WordSet> {
        let pattern = Self::validate_pattern(pattern)?;
        let mut matched = WordSet::default();

        // Exact containment is always a valid match; take it without
        // touching the suffix array.
        if self.store.contains_word(&pattern) {
            matched.insert(pattern.clone());
        }

        let bytes = self.text.as_bytes();
        let needle = pattern.as_bytes();
        let start = self
            .suffix_array
            .partition_point(|&offset| &bytes[offset..] < needle);
        let end = self.suffix_array[start..].partition_point(|&offset| {
            bytes[offset..].starts_with(needle)
        }) + start;

        for &offset in &self.suffix_array[start..end] {
            matched.insert(self.words[self.word_index(offset)].clone());
        }
        Ok(matched)
    }

    /// Documents containing any word that contains the pattern.
    pub fn search(&self, pattern: &str) -> Result<DocumentSet> {
        let mut documents = DocumentSet::default();
        for word in self.matching_words(pattern)? {
            if let Some(word_documents) = self.store.documents_for_normalized(&word) {
                documents.extend(word_documents.iter().cloned());
            }
        }
        Ok(documents)
    }

    /// Index of the word enclosing a byte offset of `text`.
    fn word_index(&self, offset: usize) -> usize {
        // partition_point is never 0: offset 0 is the first word's start.
        self.word_starts.partition_point(|&start| start <= offset) - 1
    }

    /// End of the suffix starting at `offset`: the next separator or the
    /// end of the text.
    fn suffix_end(&self, offset: usize) -> usize {
        let bytes = self.text.as_bytes();
        bytes[offset..]
            .iter()
            .position(|&b| b == WORD_SEPARATOR as u8)
            .map_or(self.text.len(), |p| offset + p)
    }

    /// The shared bookkeeping backing this index.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Index statistics.
    pub fn statistics(&self) -> IndexStatistics {
        self.store.statistics()
    }

    /// Number of indexed suffixes.
    pub fn suffix_count(&self) -> usize {
        self.suffix_array.len()
    }

    /// Export the generalized suffix tree implied by the suffix array:
    /// edge-compressed interior nodes, one leaf per suffix, leaf metadata
    /// naming the enclosing word and its document count.
    pub fn to_structure_tree(&self) -> StructureNode {
        let mut root = StructureNode::new("root", "Suffix Tree Root");
        root.set_meta("word_count", self.words.len());
        root.set_meta("suffix_count", self.suffix_array.len());
        root.children = self.export_interval(0, self.suffix_array.len(), 0, "sfx");
        root
    }

    /// Children of the suffix-tree node covering suffix-array interval
    /// `[lo, hi)` whose suffixes share their first `depth` bytes.
    fn export_interval(&self, lo: usize, hi: usize, depth: usize, path: &str) -> Vec<StructureNode> {
        let mut children = Vec::new();
        let mut k = lo;
        while k < hi {
            let offset = self.suffix_array[k];
            let end = self.suffix_end(offset);
            if offset + depth >= end {
                // This suffix terminates here: a leaf of the suffix tree.
                children.push(self.leaf_node(offset, path));
                k += 1;
                continue;
            }
            // Run of suffixes sharing the next char.
            let run_char = self.char_at(offset + depth);
            let mut run_end = k + 1;
            while run_end < hi {
                let next = self.suffix_array[run_end];
                if next + depth >= self.suffix_end(next) || self.char_at(next + depth) != run_char
                {
                    break;
                }
                run_end += 1;
            }

            let first = self.suffix_array[k];
            if run_end == k + 1 {
                // Lone suffix: the rest of it becomes one compressed leaf
                // edge.
                let label = &self.text[first + depth..self.suffix_end(first)];
                children.push(self.leaf_with_label(first, label, path));
                k = run_end;
                continue;
            }

            // Edge label: longest common extension of the run, which for a
            // sorted run is the common prefix of its first and last
            // suffixes (clipped at the separator).
            let last = self.suffix_array[run_end - 1];
            let extension = self.common_extension(first, last, depth);
            let label = &self.text[first + depth..first + depth + extension];

            let child_path = format!("{path}/{label}");
            let mut node = StructureNode::new(format!("node_{child_path}"), label);
            node.children = self.export_interval(k, run_end, depth + extension, &child_path);
            children.push(node);
            k = run_end;
        }
        children
    }

    /// Common prefix length, in bytes, of the suffixes at `a` and `b`
    /// beyond `depth`, clipped at each suffix's separator.
    fn common_extension(&self, a: usize, b: usize, depth: usize) -> usize {
        let bytes = self.text.as_bytes();
        let a_end = self.suffix_end(a);
        let b_end = self.suffix_end(b);
        let mut len = 0;
        while a + depth + len < a_end
            && b + depth + len < b_end
            && bytes[a + depth + len] == bytes[b + depth + len]
        {
            len += 1;
        }
        // Stay on a char boundary.
        while len > 0 && !self.text.is_char_boundary(a + depth + len) {
            len -= 1;
        }
        len
    }

    fn char_at(&self, offset: usize) -> char {
        self.text[offset..].chars().next().unwrap_or(WORD_SEPARATOR)
    }

    fn leaf_node(&self, offset: usize, path: &str) -> StructureNode {
        let mut leaf = StructureNode::new(format!("node_{path}/${offset}"), "$");
        self.annotate_leaf(&mut leaf, offset);
        leaf
    }

    fn leaf_with_label(&self, offset: usize, label: &str, path: &str) -> StructureNode {
        let mut leaf = StructureNode::new(format!("node_{path}/{label}@{offset}"), label);
        self.annotate_leaf(&mut leaf, offset);
        leaf
    }

    fn annotate_leaf(&self, leaf: &mut StructureNode, offset: usize) {
        let word = &self.words[self.word_index(offset)];
        leaf.set_meta("word", word.as_str());
        leaf.set_meta("suffix_offset", offset);
        leaf.set_meta(
            "document_count",
            self.store
                .documents_for_normalized(word)
                .map_or(0, |documents| documents.len()),
        );
    }
}

impl Default for SuffixIndex {
    fn default() -> Self {
        Self::new()
    }
}
