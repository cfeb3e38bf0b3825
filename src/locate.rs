//! Pure navigation over a mindmap forest.
//!
//! Both operations are side-effect-free, depth-first pre-order walks over a snapshot the
//! caller already holds. O(total node count); at study-mindmap scale (tens to low hundreds
//! of nodes) no index is warranted.

use std::sync::Arc;

use crate::properties::{MindmapNode, NodeId};

/// Find the node with `id` anywhere in the forest.
///
/// Returns the first match in pre-order traversal (id uniqueness assumed tree-wide but not
/// enforced). `None` means absent, which is not an error condition — callers decide.
pub fn find_node<'a>(nodes: &'a [Arc<MindmapNode>], id: &NodeId) -> Option<&'a Arc<MindmapNode>> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// The root-to-target path for `id`, target inclusive. Empty when `id` is absent from the
/// forest.
pub fn find_path(nodes: &[Arc<MindmapNode>], id: &NodeId) -> Vec<Arc<MindmapNode>> {
    let mut path = Vec::new();
    if descend(nodes, id, &mut path) {
        path
    } else {
        Vec::new()
    }
}

fn descend(nodes: &[Arc<MindmapNode>], id: &NodeId, path: &mut Vec<Arc<MindmapNode>>) -> bool {
    for node in nodes {
        path.push(node.clone());
        if &node.id == id {
            return true;
        }
        if descend(&node.children, id, path) {
            return true;
        }
        path.pop();
    }
    false
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

    fn branch(id: &str, title: &str, children: Vec<Arc<MindmapNode>>) -> Arc<MindmapNode> {
        Arc::new(MindmapNode {
            id: NodeId::from(id),
            title: title.to_string(),
            children,
            ..Default::default()
        })
    }

    /// A -> B -> C, plus a second root D.
    fn forest() -> Vec<Arc<MindmapNode>> {
        vec![
            branch("a", "A", vec![branch("b", "B", vec![leaf("c", "C")])]),
            leaf("d", "D"),
        ]
    }

    #[test]
    fn test_find_node_at_depth() {
        let nodes = forest();
        let found = find_node(&nodes, &NodeId::from("c")).expect("C should be found");
        assert_eq!(found.title, "C");
    }

    #[test]
    fn test_find_node_second_root() {
        let nodes = forest();
        let found = find_node(&nodes, &NodeId::from("d")).expect("D should be found");
        assert_eq!(found.title, "D");
    }

    #[test]
    fn test_find_node_missing_is_none() {
        let nodes = forest();
        assert!(find_node(&nodes, &NodeId::from("missing")).is_none());
    }

    #[test]
    fn test_find_path_root_to_target() {
        let nodes = forest();
        let path = find_path(&nodes, &NodeId::from("c"));
        let titles: Vec<&str> = path.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_find_path_single_node() {
        let nodes = forest();
        let path = find_path(&nodes, &NodeId::from("d"));
        let titles: Vec<&str> = path.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["D"]);
    }

    #[test]
    fn test_find_path_missing_is_empty() {
        let nodes = forest();
        assert!(find_path(&nodes, &NodeId::from("missing")).is_empty());
    }
}
