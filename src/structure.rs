//! Structural export of index internals for visualization.
//!
//! [`StructureNode`] is a lossless rendering of the real trie/suffix
//! nodes: one node per actual structure node, edge labels on children,
//! per-leaf document counts in the metadata. Exports are complete by
//! default; callers needing a bounded view apply [`StructureLimits`],
//! which marks every elision with `truncated: true` metadata instead of
//! silently hiding data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of an exported index structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureNode {
    /// Stable identifier, derived from the node's path in the structure.
    pub id: String,
    /// Human-readable label (edge label, word, or root caption).
    pub label: String,
    /// Ordered child nodes.
    #[serde(default)]
    pub children: Vec<StructureNode>,
    /// Optional metadata map (document counts, truncation markers, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl StructureNode {
    /// Create a childless node without metadata.
    pub fn new<S: Into<String>, L: Into<String>>(id: S, label: L) -> Self {
        StructureNode {
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
            metadata: None,
        }
    }

    /// Insert a metadata entry, creating the map on first use.
    pub fn set_meta<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
    }

    /// Total node count including this node.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Produce a bounded copy of this tree.
    ///
    /// Nodes whose children were cut by depth, and nodes whose child list
    /// was shortened by fan-out, carry `truncated: true` plus the number
    /// of elided children.
    pub fn bounded(&self, limits: &StructureLimits) -> StructureNode {
        self.bounded_at(0, limits)
    }

    fn bounded_at(&self, depth: usize, limits: &StructureLimits) -> StructureNode {
        let mut node = StructureNode {
            id: self.id.clone(),
            label: self.label.clone(),
            children: Vec::new(),
            metadata: self.metadata.clone(),
        };

        if self.children.is_empty() {
            return node;
        }
        if depth >= limits.max_depth {
            node.set_meta("truncated", true);
            node.set_meta("elided_children", self.children.len());
            return node;
        }

        let keep = self.children.len().min(limits.max_children);
        node.children = self.children[..keep]
            .iter()
            .map(|child| child.bounded_at(depth + 1, limits))
            .collect();
        if keep < self.children.len() {
            node.set_meta("truncated", true);
            node.set_meta("elided_children", self.children.len() - keep);
        }
        node
    }
}

/// Depth and fan-out limits for a bounded structure view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureLimits {
    /// Maximum depth below the root to descend into.
    pub max_depth: usize,
    /// Maximum children to keep per node.
    pub max_children: usize,
}

impl Default for StructureLimits {
    fn default() -> Self {
        StructureLimits {
            max_depth: 8,
            max_children: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deep_tree() -> StructureNode {
        let mut leaf = StructureNode::new("leaf", "leaf");
        leaf.set_meta("document_count", 3);

        let mut mid = StructureNode::new("mid", "mid");
        mid.children = (0..5)
            .map(|i| StructureNode::new(format!("c{i}"), format!("c{i}")))
            .collect();
        mid.children.push(leaf);

        let mut root = StructureNode::new("root", "root");
        root.children.push(mid);
        root
    }

    #[test]
    fn test_node_count() {
        assert_eq!(deep_tree().node_count(), 8);
    }

    #[test]
    fn test_depth_truncation_is_marked() {
        let tree = deep_tree();
        let bounded = tree.bounded(&StructureLimits {
            max_depth: 1,
            max_children: 64,
        });

        let mid = &bounded.children[0];
        assert!(mid.children.is_empty());
        let meta = mid.metadata.as_ref().unwrap();
        assert_eq!(meta.get("truncated"), Some(&Value::Bool(true)));
        assert_eq!(meta.get("elided_children"), Some(&Value::from(6)));
    }

    #[test]
    fn test_fanout_truncation_is_marked() {
        let tree = deep_tree();
        let bounded = tree.bounded(&StructureLimits {
            max_depth: 8,
            max_children: 2,
        });

        let mid = &bounded.children[0];
        assert_eq!(mid.children.len(), 2);
        let meta = mid.metadata.as_ref().unwrap();
        assert_eq!(meta.get("truncated"), Some(&Value::Bool(true)));
        assert_eq!(meta.get("elided_children"), Some(&Value::from(4)));
    }

    #[test]
    fn test_unbounded_copy_is_lossless() {
        let tree = deep_tree();
        let bounded = tree.bounded(&StructureLimits::default());
        assert_eq!(tree, bounded);
    }

    #[test]
    fn test_serialization_round_trip() {
        let tree = deep_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: StructureNode = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, back);
    }
}
