//! Dedup merge and single-node edit over [MindmapTree] values.
//!
//! Neither operation mutates in place. Both rebuild only the spine from a root down to the
//! target node and reuse every other subtree by [`Arc`] reference, so consumers relying on
//! reference equality to skip re-render work see untouched branches unchanged.
//!
//! Neither operation can fail: a missing target comes back as
//! [MergeOutcome::TargetMissing] next to the unchanged tree rather than as an error, so a
//! stale id from the UI degrades to a reported no-op instead of a crash.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, sync::Arc};

use crate::properties::{sibling_order, title_key, MindmapNode, MindmapTree, NodeId};

/// Terminal outcome of a merge or edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeOutcome {
    /// Target found and updated. For merges, `added` counts the candidates that survived
    /// dedup — zero (all duplicates) is still success. For edits, `added` is always zero.
    Merged { added: usize },
    /// Target id absent from the forest; the returned tree is the input, unchanged.
    TargetMissing,
}

/// Replacement display fields for [edit_node]. Children are never part of a patch — edits
/// must not touch descendants.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub study_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

impl From<&MindmapNode> for NodePatch {
    fn from(node: &MindmapNode) -> Self {
        NodePatch {
            title: node.title.clone(),
            summary: node.summary.clone(),
            ai_hint: node.ai_hint.clone(),
            study_actions: node.study_actions.clone(),
            priority: node.priority,
            references: node.references.clone(),
        }
    }
}

/// Merge a batch of candidate children under the node with `target` id.
///
/// Candidates are considered in input order. A candidate is a duplicate — and skipped —
/// when its id or its [title_key] matches an existing child *or an earlier accepted
/// candidate from the same batch*. Survivors are appended, then the full child list is
/// re-sorted by [sibling_order] (stable, so priority-less children keep their relative
/// order). Re-merging an identical batch therefore adds nothing.
pub fn merge_children(
    tree: &MindmapTree,
    target: &NodeId,
    candidates: &[Arc<MindmapNode>],
) -> (MindmapTree, MergeOutcome) {
    match merge_into(&tree.nodes, target, candidates) {
        Some((nodes, added)) => (
            MindmapTree {
                title: tree.title.clone(),
                overview: tree.overview.clone(),
                nodes,
                study_plan: tree.study_plan.clone(),
            },
            MergeOutcome::Merged { added },
        ),
        None => {
            tracing::warn!(
                "[merge] target node {target} not present in tree, returning input unchanged"
            );
            (tree.clone(), MergeOutcome::TargetMissing)
        }
    }
}

/// Replace one node's display fields, preserving its existing children verbatim.
///
/// Sibling order is *not* re-derived: only merges re-sort, so an edited priority takes
/// visual effect at the next merge under the same parent.
pub fn edit_node(
    tree: &MindmapTree,
    target: &NodeId,
    patch: &NodePatch,
) -> (MindmapTree, MergeOutcome) {
    match patch_into(&tree.nodes, target, patch) {
        Some(nodes) => (
            MindmapTree {
                title: tree.title.clone(),
                overview: tree.overview.clone(),
                nodes,
                study_plan: tree.study_plan.clone(),
            },
            MergeOutcome::Merged { added: 0 },
        ),
        None => {
            tracing::warn!(
                "[edit] target node {target} not present in tree, returning input unchanged"
            );
            (tree.clone(), MergeOutcome::TargetMissing)
        }
    }
}

/// Rebuild the sibling list containing `target` (at any depth), sharing every untouched
/// subtree. `None` when `target` is absent from this subforest.
fn merge_into(
    nodes: &[Arc<MindmapNode>],
    target: &NodeId,
    candidates: &[Arc<MindmapNode>],
) -> Option<(Vec<Arc<MindmapNode>>, usize)> {
    for (idx, node) in nodes.iter().enumerate() {
        let rebuilt = if &node.id == target {
            let (children, added) = merge_siblings(&node.children, candidates);
            Some((
                Arc::new(MindmapNode {
                    children,
                    ..(**node).clone()
                }),
                added,
            ))
        } else {
            merge_into(&node.children, target, candidates).map(|(children, added)| {
                (
                    Arc::new(MindmapNode {
                        children,
                        ..(**node).clone()
                    }),
                    added,
                )
            })
        };
        if let Some((new_node, added)) = rebuilt {
            let mut out = Vec::with_capacity(nodes.len());
            out.extend_from_slice(&nodes[..idx]);
            out.push(new_node);
            out.extend_from_slice(&nodes[idx + 1..]);
            return Some((out, added));
        }
    }
    None
}

fn merge_siblings(
    existing: &[Arc<MindmapNode>],
    candidates: &[Arc<MindmapNode>],
) -> (Vec<Arc<MindmapNode>>, usize) {
    let mut seen_ids: BTreeSet<NodeId> = existing.iter().map(|n| n.id.clone()).collect();
    let mut seen_titles: BTreeSet<String> = existing.iter().map(|n| title_key(&n.title)).collect();

    let mut merged = existing.to_vec();
    let mut added = 0;
    for candidate in candidates {
        let key = title_key(&candidate.title);
        if seen_ids.contains(&candidate.id) || seen_titles.contains(&key) {
            tracing::debug!(
                "[merge] skipping duplicate candidate '{}' ({})",
                candidate.title,
                candidate.id
            );
            continue;
        }
        seen_ids.insert(candidate.id.clone());
        seen_titles.insert(key);
        merged.push(candidate.clone());
        added += 1;
    }

    merged.sort_by(|a, b| sibling_order(a, b));
    (merged, added)
}

fn patch_into(
    nodes: &[Arc<MindmapNode>],
    target: &NodeId,
    patch: &NodePatch,
) -> Option<Vec<Arc<MindmapNode>>> {
    for (idx, node) in nodes.iter().enumerate() {
        let rebuilt = if &node.id == target {
            Some(Arc::new(MindmapNode {
                id: node.id.clone(),
                title: patch.title.clone(),
                summary: patch.summary.clone(),
                priority: patch.priority,
                study_actions: patch.study_actions.clone(),
                references: patch.references.clone(),
                ai_hint: patch.ai_hint.clone(),
                children: node.children.clone(),
            }))
        } else {
            patch_into(&node.children, target, patch).map(|children| {
                Arc::new(MindmapNode {
                    children,
                    ..(**node).clone()
                })
            })
        };
        if let Some(new_node) = rebuilt {
            let mut out = Vec::with_capacity(nodes.len());
            out.extend_from_slice(&nodes[..idx]);
            out.push(new_node);
            out.extend_from_slice(&nodes[idx + 1..]);
            return Some(out);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, title: &str) -> Arc<MindmapNode> {
        Arc::new(MindmapNode {
            id: NodeId::from(id),
            title: title.to_string(),
            ..Default::default()
        })
    }

    fn leaf_pri(id: &str, title: &str, priority: i64) -> Arc<MindmapNode> {
        Arc::new(MindmapNode {
            id: NodeId::from(id),
            title: title.to_string(),
            priority: Some(priority),
            ..Default::default()
        })
    }

    fn branch(id: &str, title: &str, children: Vec<Arc<MindmapNode>>) -> Arc<MindmapNode> {
        Arc::new(MindmapNode {
            id: NodeId::from(id),
            title: title.to_string(),
            children,
            ..Default::default()
        })
    }

    /// Three roots; the merge target "inner" sits at depth 2 under the first.
    fn three_root_tree() -> MindmapTree {
        MindmapTree {
            title: "Biology".to_string(),
            nodes: vec![
                branch(
                    "cells",
                    "Cells",
                    vec![branch("organelles", "Organelles", vec![leaf("inner", "Inner")])],
                ),
                leaf("genetics", "Genetics"),
                leaf("ecology", "Ecology"),
            ],
            ..Default::default()
        }
    }

    fn children_of<'a>(tree: &'a MindmapTree, id: &str) -> &'a [Arc<MindmapNode>] {
        &crate::locate::find_node(&tree.nodes, &NodeId::from(id))
            .expect("target should exist")
            .children
    }

    #[test]
    fn test_merge_appends_and_sorts() {
        let tree = three_root_tree();
        let candidates = vec![
            leaf_pri("z", "Zeta", 3),
            leaf("al", "Alpha"),
            leaf_pri("be", "Beta", 1),
        ];
        let (merged, outcome) = merge_children(&tree, &NodeId::from("inner"), &candidates);
        assert_eq!(outcome, MergeOutcome::Merged { added: 3 });

        let titles: Vec<&str> = children_of(&merged, "inner")
            .iter()
            .map(|n| n.title.as_str())
            .collect();
        // Priority ascending, absent priority last.
        assert_eq!(titles, vec!["Beta", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_merge_dedup_by_id_or_title() {
        let tree = MindmapTree {
            nodes: vec![branch("root", "Root", vec![leaf("a", "Foo")])],
            ..Default::default()
        };
        let candidates = vec![
            leaf("a", "Bar"),   // id collides with existing child
            leaf("b", "foo "),  // normalized title collides with "Foo"
            leaf("c", "Baz"),
        ];
        let (merged, outcome) = merge_children(&tree, &NodeId::from("root"), &candidates);
        assert_eq!(outcome, MergeOutcome::Merged { added: 1 });

        let titles: Vec<&str> = children_of(&merged, "root")
            .iter()
            .map(|n| n.title.as_str())
            .collect();
        // Both priority-less: stable sort keeps existing-then-added order.
        assert_eq!(titles, vec!["Foo", "Baz"]);
    }

    #[test]
    fn test_merge_dedup_within_batch() {
        let tree = MindmapTree {
            nodes: vec![leaf("root", "Root")],
            ..Default::default()
        };
        let candidates = vec![
            leaf("x", "Mitosis"),
            leaf("y", "mitosis"), // duplicates an earlier accepted candidate
            leaf("x", "Meiosis"), // id duplicates an earlier accepted candidate
        ];
        let (merged, outcome) = merge_children(&tree, &NodeId::from("root"), &candidates);
        assert_eq!(outcome, MergeOutcome::Merged { added: 1 });
        assert_eq!(children_of(&merged, "root").len(), 1);
    }

    #[test]
    fn test_merge_idempotent() {
        let tree = three_root_tree();
        let candidates = vec![leaf_pri("be", "Beta", 1), leaf("al", "Alpha")];
        let target = NodeId::from("inner");

        let (once, outcome) = merge_children(&tree, &target, &candidates);
        assert_eq!(outcome, MergeOutcome::Merged { added: 2 });

        let (twice, outcome) = merge_children(&once, &target, &candidates);
        assert_eq!(outcome, MergeOutcome::Merged { added: 0 });
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_structural_sharing() {
        let tree = three_root_tree();
        let (merged, _) = merge_children(
            &tree,
            &NodeId::from("organelles"),
            &[leaf("nucleus", "Nucleus")],
        );

        // Untouched roots are the same allocation as before the merge.
        assert!(Arc::ptr_eq(&tree.nodes[1], &merged.nodes[1]));
        assert!(Arc::ptr_eq(&tree.nodes[2], &merged.nodes[2]));
        // The spine down to the target was rebuilt.
        assert!(!Arc::ptr_eq(&tree.nodes[0], &merged.nodes[0]));
        // Pre-existing children below the target keep their allocation too.
        let inner_before = crate::locate::find_node(&tree.nodes, &NodeId::from("inner")).unwrap();
        let inner_after = crate::locate::find_node(&merged.nodes, &NodeId::from("inner")).unwrap();
        assert!(Arc::ptr_eq(inner_before, inner_after));
    }

    #[test]
    fn test_merge_missing_target_is_reported_noop() {
        let tree = three_root_tree();
        let (merged, outcome) =
            merge_children(&tree, &NodeId::from("nonexistent"), &[leaf("x", "X")]);
        assert_eq!(outcome, MergeOutcome::TargetMissing);
        assert_eq!(merged, tree);
    }

    #[test]
    fn test_merge_preserves_tree_metadata() {
        let mut tree = three_root_tree();
        tree.study_plan = vec![serde_json::json!({"phase": "review", "days": 3})];
        let (merged, _) = merge_children(&tree, &NodeId::from("inner"), &[leaf("x", "X")]);
        assert_eq!(merged.title, "Biology");
        assert_eq!(merged.study_plan, tree.study_plan);
    }

    #[test]
    fn test_edit_replaces_fields_preserves_children() {
        let tree = three_root_tree();
        let patch = NodePatch {
            title: "Cell Organelles".to_string(),
            summary: Some("Structures within the cell".to_string()),
            priority: Some(2),
            ..Default::default()
        };
        let (edited, outcome) = edit_node(&tree, &NodeId::from("organelles"), &patch);
        assert_eq!(outcome, MergeOutcome::Merged { added: 0 });

        let node =
            crate::locate::find_node(&edited.nodes, &NodeId::from("organelles")).unwrap();
        assert_eq!(node.title, "Cell Organelles");
        assert_eq!(node.summary.as_deref(), Some("Structures within the cell"));
        assert_eq!(node.priority, Some(2));
        // Children are verbatim: same allocation, untouched.
        let before =
            crate::locate::find_node(&tree.nodes, &NodeId::from("organelles")).unwrap();
        assert_eq!(node.children.len(), 1);
        assert!(Arc::ptr_eq(&node.children[0], &before.children[0]));
    }

    #[test]
    fn test_edit_missing_target_is_reported_noop() {
        let tree = three_root_tree();
        let patch = NodePatch {
            title: "Anything".to_string(),
            ..Default::default()
        };
        let (edited, outcome) = edit_node(&tree, &NodeId::from("nonexistent"), &patch);
        assert_eq!(outcome, MergeOutcome::TargetMissing);
        assert_eq!(edited, tree);
    }

    #[test]
    fn test_edit_shares_unrelated_roots() {
        let tree = three_root_tree();
        let patch = NodePatch {
            title: "Genetics II".to_string(),
            ..Default::default()
        };
        let (edited, _) = edit_node(&tree, &NodeId::from("genetics"), &patch);
        assert!(Arc::ptr_eq(&tree.nodes[0], &edited.nodes[0]));
        assert!(Arc::ptr_eq(&tree.nodes[2], &edited.nodes[2]));
    }
}
