//! Flat-list to forest conversion, shared by the organization and
//! permission screens.
//!
//! The builder is best-effort by design: duplicate ids resolve
//! last-seen-wins, a node whose parent is missing from the collection
//! becomes a root (partial fetches must not crash the tree view), and
//! reference cycles cannot loop the assembly walk. It never fails.

use std::collections::{HashMap, HashSet};

use crate::types::{Node, TreeNode};

/// Convert an unordered flat collection into a forest.
///
/// Root order and sibling order equal first-occurrence order in the input.
/// Nodes trapped in a parent cycle are not reachable from any root and are
/// dropped from the output.
pub fn build_forest(nodes: Vec<Node>) -> Vec<TreeNode> {
    // Pass 1: index by id. Later duplicates overwrite earlier ones; the
    // first occurrence fixes the position in the output order.
    let mut index: HashMap<i64, Node> = HashMap::with_capacity(nodes.len());
    let mut order: Vec<i64> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if !index.contains_key(&node.id) {
            order.push(node.id);
        }
        index.insert(node.id, node);
    }

    // Pass 2: attach each node to its parent when the parent is present in
    // the index, otherwise promote it to root. Self-references are roots.
    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut roots: Vec<i64> = Vec::new();
    for id in &order {
        let parent = index[id]
            .parent_id
            .filter(|p| p != id && index.contains_key(p));
        match parent {
            Some(p) => children.entry(p).or_default().push(*id),
            None => roots.push(*id),
        }
    }

    let mut visited: HashSet<i64> = HashSet::new();
    roots
        .iter()
        .map(|id| assemble(*id, &index, &children, &mut visited))
        .collect()
}

/// Depth walk from a root. The visited set guards against cycles reachable
/// through corrupted parent links.
fn assemble(
    id: i64,
    index: &HashMap<i64, Node>,
    children: &HashMap<i64, Vec<i64>>,
    visited: &mut HashSet<i64>,
) -> TreeNode {
    visited.insert(id);
    let child_nodes = children
        .get(&id)
        .map(|ids| ids.as_slice())
        .unwrap_or(&[])
        .iter()
        .filter_map(|child| {
            if visited.contains(child) {
                None
            } else {
                Some(assemble(*child, index, children, visited))
            }
        })
        .collect();
    TreeNode {
        node: index[&id].clone(),
        children: child_nodes,
    }
}

/// Preorder flattening of a forest.
pub fn flatten(forest: &[TreeNode]) -> Vec<&Node> {
    let mut out = Vec::new();
    let mut stack: Vec<&TreeNode> = forest.iter().rev().collect();
    while let Some(tree) = stack.pop() {
        out.push(&tree.node);
        for child in tree.children.iter().rev() {
            stack.push(child);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;

    fn node(id: i64, parent_id: Option<i64>) -> Node {
        Node {
            id,
            parent_id,
            name: format!("node-{id}"),
            code: format!("code-{id}"),
            kind: "department".into(),
            status: Status::Active,
        }
    }

    #[test]
    fn test_basic_forest() {
        // [{id:1,parent:null},{id:2,parent:1},{id:3,parent:99}] ->
        // two roots: 1 (with child 2) and the orphaned 3.
        let forest = build_forest(vec![node(1, None), node(2, Some(1)), node(3, Some(99))]);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].node.id, 1);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].node.id, 2);
        assert_eq!(forest[1].node.id, 3);
        assert!(forest[1].children.is_empty());
        assert_eq!(flatten(&forest).len(), 3);
    }

    #[test]
    fn test_size_preserving() {
        let nodes: Vec<Node> = (0..50)
            .map(|i| node(i, if i == 0 { None } else { Some(i / 2) }))
            .collect();
        let forest = build_forest(nodes);
        let mut ids: Vec<i64> = flatten(&forest).iter().map(|n| n.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..50).collect::<Vec<i64>>());
    }

    #[test]
    fn test_root_count_matches_parentless_nodes() {
        let forest = build_forest(vec![
            node(1, None),
            node(2, None),
            node(3, Some(1)),
            node(4, Some(2)),
        ]);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let mut renamed = node(1, None);
        renamed.name = "renamed".into();
        let forest = build_forest(vec![node(1, None), node(2, Some(1)), renamed]);
        // One entry per distinct id; the later record wins the index slot.
        assert_eq!(flatten(&forest).len(), 2);
        assert_eq!(forest[0].node.name, "renamed");
    }

    #[test]
    fn test_input_order_is_preserved() {
        let forest = build_forest(vec![
            node(7, None),
            node(3, None),
            node(9, Some(3)),
            node(5, Some(3)),
        ]);
        let root_ids: Vec<i64> = forest.iter().map(|t| t.node.id).collect();
        assert_eq!(root_ids, vec![7, 3]);
        let sibling_ids: Vec<i64> = forest[1].children.iter().map(|t| t.node.id).collect();
        assert_eq!(sibling_ids, vec![9, 5]);
    }

    #[test]
    fn test_self_reference_becomes_root() {
        let forest = build_forest(vec![node(1, Some(1)), node(2, Some(1))]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].node.id, 1);
        assert_eq!(forest[0].children[0].node.id, 2);
    }

    #[test]
    fn test_cycle_does_not_loop() {
        // 1 <-> 2 reference each other; neither is a root, so both drop
        // out of the forest, but the builder must terminate cleanly.
        let forest = build_forest(vec![node(1, Some(2)), node(2, Some(1)), node(3, None)]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].node.id, 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_forest(Vec::new()).is_empty());
    }
}
