//! Compressed prefix trie (PATRICIA / radix tree) over the vocabulary.
//!
//! Exact and prefix lookup in time proportional to the key length,
//! independent of vocabulary size. Chains of single-child nodes are
//! collapsed into one edge labeled with the shared substring; after every
//! mutation each non-root node is either a terminal or has at least two
//! children, no edge label is empty, and the concatenation of edge labels
//! from the root to a terminal spells exactly one stored word.
//!
//! Document sets are not duplicated into the trie: terminal nodes record
//! the word they spell, and lookups resolve documents through the shared
//! [`TokenStore`].

use std::collections::BTreeMap;

use crate::error::Result;
use crate::structure::StructureNode;
use crate::token_store::{DocumentSet, IndexStatistics, TokenStore};

/// Byte length of the longest common prefix of two strings, always on a
/// char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    let mut len = 0;
    let mut a_chars = a.chars();
    let mut b_chars = b.chars();
    loop {
        match (a_chars.next(), b_chars.next()) {
            (Some(ca), Some(cb)) if ca == cb => len += ca.len_utf8(),
            _ => return len,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    /// Edge label from the parent; empty only at the root.
    label: String,
    /// The stored word this node terminates, if any.
    word: Option<String>,
    /// Children keyed by the first char of their edge label.
    children: BTreeMap<char, Node>,
}

impl Node {
    fn leaf(label: &str, word: &str) -> Self {
        Node {
            label: label.to_string(),
            word: Some(word.to_string()),
            children: BTreeMap::new(),
        }
    }
}

/// Exact/prefix word index backed by a compressed trie and a
/// [`TokenStore`].
#[derive(Debug, Clone)]
pub struct PatriciaIndex {
    store: TokenStore,
    root: Node,
}

impl PatriciaIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        PatriciaIndex {
            store: TokenStore::new(),
            root: Node::default(),
        }
    }

    /// Rebuild an index from existing bookkeeping, e.g. a restored
    /// snapshot. The trie shape is deterministic in the vocabulary.
    pub fn from_store(store: TokenStore) -> Self {
        let mut index = PatriciaIndex {
            store,
            root: Node::default(),
        };
        let words: Vec<String> = index.store.words().iter().map(|w| w.to_string()).collect();
        for word in &words {
            Self::insert_key(&mut index.root, word, word);
        }
        index
    }

    /// Insert a word for a document: updates the bookkeeping and the trie
    /// in the same logical step.
    pub fn insert(&mut self, word: &str, document_id: &str) -> Result<()> {
        let word = TokenStore::normalize_word(word)?;
        self.store.add(&word, document_id)?;
        Self::insert_key(&mut self.root, &word, &word);
        Ok(())
    }

    /// Insert every word of a tokenized document.
    pub fn add_document<I, W>(&mut self, document_id: &str, words: I) -> Result<()>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        for word in words {
            self.insert(word.as_ref(), document_id)?;
        }
        Ok(())
    }

    fn insert_key(node: &mut Node, rest: &str, full: &str) {
        if rest.is_empty() {
            node.word = Some(full.to_string());
            return;
        }
        let Some(first) = rest.chars().next() else {
            return;
        };
        match node.children.get_mut(&first) {
            None => {
                node.children.insert(first, Node::leaf(rest, full));
            }
            Some(child) => {
                let lcp = common_prefix_len(rest, &child.label);
                if lcp == child.label.len() {
                    // Edge fully matched: descend.
                    Self::insert_key(child, &rest[lcp..], full);
                    return;
                }
                // Split the edge at the common-prefix boundary. Everything
                // previously below the child stays reachable under the new
                // branch node.
                let mut old = std::mem::take(child);
                old.label = old.label[lcp..].to_string();
                let Some(old_first) = old.label.chars().next() else {
                    return;
                };
                child.label = rest[..lcp].to_string();
                child.children.insert(old_first, old);

                let remaining = &rest[lcp..];
                if remaining.is_empty() {
                    child.word = Some(full.to_string());
                } else if let Some(rem_first) = remaining.chars().next() {
                    child.children.insert(rem_first, Node::leaf(remaining, full));
                }
            }
        }
    }

    /// Remove a word from the bookkeeping and the trie. Returns whether
    /// the word existed.
    pub fn remove_word(&mut self, word: &str) -> bool {
        let word = word.to_lowercase();
        if !self.store.remove_word(&word) {
            return false;
        }
        Self::remove_key(&mut self.root, &word);
        true
    }

    /// Remove a word only from the trie. Returns whether it was a stored
    /// key.
    pub fn delete(&mut self, word: &str) -> bool {
        let word = word.to_lowercase();
        if !Self::remove_key(&mut self.root, &word) {
            return false;
        }
        self.store.remove_word(&word);
        true
    }

    fn remove_key(node: &mut Node, rest: &str) -> bool {
        if rest.is_empty() {
            if node.word.is_none() {
                return false;
            }
            node.word = None;
            return true;
        }
        let Some(first) = rest.chars().next() else {
            return false;
        };
        let Some(child) = node.children.get_mut(&first) else {
            return false;
        };
        if !rest.starts_with(child.label.as_str()) {
            return false;
        }
        let consumed = child.label.len();
        if !Self::remove_key(child, &rest[consumed..]) {
            return false;
        }
        // Re-establish the compression invariant below this node.
        if child.word.is_none() && child.children.is_empty() {
            node.children.remove(&first);
        } else if child.word.is_none() && child.children.len() == 1 {
            if let Some((_, mut only)) = child.children.pop_first() {
                only.label = format!("{}{}", child.label, only.label);
                *child = only;
            }
        }
        true
    }

    /// Documents for an exact word match. Empty set when absent.
    pub fn exact(&self, word: &str) -> DocumentSet {
        let word = word.to_lowercase();
        match self.find_node(&word) {
            Some(node) if node.word.is_some() => self.store.documents_for(&word),
            _ => DocumentSet::default(),
        }
    }

    /// All stored words starting with the prefix, in lexicographic order.
    /// The complete set is returned; callers apply their own limits.
    pub fn prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        let mut words = Vec::new();
        Self::collect_under(&self.root, &prefix, &mut words);
        words
    }

    fn collect_under(node: &Node, rest: &str, out: &mut Vec<String>) {
        if rest.is_empty() {
            Self::collect_terminals(node, out);
            return;
        }
        let Some(first) = rest.chars().next() else {
            return;
        };
        let Some(child) = node.children.get(&first) else {
            return;
        };
        if rest.len() <= child.label.len() {
            // Prefix ends inside this edge; the whole subtree matches.
            if child.label.starts_with(rest) {
                Self::collect_terminals(child, out);
            }
        } else if rest.starts_with(child.label.as_str()) {
            Self::collect_under(child, &rest[child.label.len()..], out);
        }
    }

    fn collect_terminals(node: &Node, out: &mut Vec<String>) {
        if let Some(word) = &node.word {
            out.push(word.clone());
        }
        for child in node.children.values() {
            Self::collect_terminals(child, out);
        }
    }

    /// Locate the node reached by consuming exactly `key`.
    fn find_node(&self, key: &str) -> Option<&Node> {
        let mut node = &self.root;
        let mut rest = key;
        while !rest.is_empty() {
            let first = rest.chars().next()?;
            let child = node.children.get(&first)?;
            if !rest.starts_with(child.label.as_str()) {
                return None;
            }
            rest = &rest[child.label.len()..];
            node = child;
        }
        Some(node)
    }

    /// The shared bookkeeping backing this index.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Index statistics.
    pub fn statistics(&self) -> IndexStatistics {
        self.store.statistics()
    }

    /// Export the real trie: one [`StructureNode`] per trie node, edge
    /// labels on children, `document_count` on terminals.
    pub fn to_structure_tree(&self) -> StructureNode {
        let mut root = StructureNode::new("root", "PATRICIA Root");
        root.set_meta("word_count", self.store.word_count());
        for child in self.root.children.values() {
            root.children.push(self.export_node(child, &child.label));
        }
        root
    }

    fn export_node(&self, node: &Node, path: &str) -> StructureNode {
        let mut exported = StructureNode::new(format!("node_{path}"), node.label.clone());
        if let Some(word) = &node.word {
            exported.set_meta("word", word.as_str());
            exported.set_meta(
                "document_count",
                self.store
                    .documents_for_normalized(word)
                    .map_or(0, |documents| documents.len()),
            );
        }
        for child in node.children.values() {
            let child_path = format!("{path}{}", child.label);
            exported.children.push(self.export_node(child, &child_path));
        }
        exported
    }
}

impl Default for PatriciaIndex {
    fn default() -> Self {
        Self::new()
    }
}
