//! Core data model: node identifiers, concept nodes, and the mindmap forest.
//!
//! Trees are built from [`Arc`]-wrapped nodes so that [crate::merge] can produce updated
//! tree values while reusing every untouched subtree by reference.

use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    sync::Arc,
};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use uuid::Uuid;

use crate::error::RamifyError;

/// Maximum nesting depth accepted by [MindmapTree::validate].
pub const MAX_MINDMAP_DEPTH: usize = 100;

/// Maximum total node count accepted by [MindmapTree::validate].
pub const MAX_MINDMAP_NODES: usize = 10_000;

/// Opaque node identifier, assigned by whoever created the node and stable from then on:
/// merges and edits never regenerate an existing node's id.
///
/// Uniqueness is expected tree-wide but only enforced among siblings during a merge; see
/// [crate::locate::find_node] for the first-match semantics that follow.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        NodeId(id.into())
    }

    /// Mint a fresh identifier. Used for candidates the collaborator delivered without one.
    pub fn generate() -> Self {
        NodeId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

/// One concept in the mindmap, with optional study metadata and ordered children.
///
/// Serialized camelCase (`aiHint`, `studyActions`) so payloads persisted by the surrounding
/// application round-trip unchanged.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindmapNode {
    pub id: NodeId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Lower value = higher study priority. Absent priorities sort after all present ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub study_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_hint: Option<String>,
    /// Ordered: this is the visual/study order, re-derived after every merge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<MindmapNode>>,
}

impl MindmapNode {
    /// Node count of this node's subtree, itself included.
    pub fn subtree_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.subtree_count())
            .sum::<usize>()
    }
}

/// The mindmap document: a forest of root concepts plus document-level metadata.
///
/// `study_plan` is passthrough data owned by the surrounding application; it is carried
/// verbatim through every merge and edit.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindmapTree {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub nodes: Vec<Arc<MindmapNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub study_plan: Vec<serde_json::Value>,
}

impl MindmapTree {
    /// Total node count across the forest.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(|node| node.subtree_count()).sum()
    }

    /// Check the forest against [MAX_MINDMAP_DEPTH] and [MAX_MINDMAP_NODES].
    ///
    /// Applied when a tree is installed into an [crate::explore::Explorer] (full generation
    /// or regeneration), never during merge — merges only ever grow one child list.
    pub fn validate(&self) -> Result<(), RamifyError> {
        let mut count = 0usize;
        for node in &self.nodes {
            validate_node(node, 1, &mut count)?;
        }
        Ok(())
    }
}

fn validate_node(
    node: &MindmapNode,
    depth: usize,
    count: &mut usize,
) -> Result<(), RamifyError> {
    if depth > MAX_MINDMAP_DEPTH {
        return Err(RamifyError::Validation(format!(
            "mindmap depth exceeds limit ({MAX_MINDMAP_DEPTH})"
        )));
    }
    *count += 1;
    if *count > MAX_MINDMAP_NODES {
        return Err(RamifyError::Validation(format!(
            "mindmap node count exceeds limit ({MAX_MINDMAP_NODES})"
        )));
    }
    for child in &node.children {
        validate_node(child, depth + 1, count)?;
    }
    Ok(())
}

/// Turn a title into its duplicate-detection key: trimmed, NFKD-decomposed with combining
/// marks stripped, lowercased. "Café " and "cafe" collide by design.
pub fn title_key(title: &str) -> String {
    title
        .trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Sibling ordering rule: priority ascending with absent priorities last; ties between
/// present priorities broken by case/diacritic-insensitive title comparison.
///
/// Two priority-less nodes compare equal so that a stable sort preserves their original
/// relative order.
pub fn sibling_order(a: &MindmapNode, b: &MindmapNode) -> Ordering {
    match (a.priority, b.priority) {
        (Some(x), Some(y)) => x
            .cmp(&y)
            .then_with(|| title_key(&a.title).cmp(&title_key(&b.title))),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
