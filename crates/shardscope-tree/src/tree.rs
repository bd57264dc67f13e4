use std::ops::Index;

use serde::Serialize;

use crate::node::{NodeId, TreeNode};

/// Arena holding every node of a call tree.
///
/// Nodes own nothing; parent and child links are [`NodeId`]s into this arena,
/// so the tree has no reference cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallTree {
  nodes: Vec<TreeNode>,
  root: NodeId,
}

impl CallTree {
  /// Create a tree holding only `root`, which starts expanded.
  pub(crate) fn with_root(mut root: TreeNode) -> Self {
    root.id = NodeId(0);
    root.parent = None;
    root.expanded = true;
    Self {
      nodes: vec![root],
      root: NodeId(0),
    }
  }

  /// Append `node` as the last child of `parent`.
  pub(crate) fn push_child(&mut self, parent: NodeId, mut node: TreeNode) -> NodeId {
    let id = NodeId(self.nodes.len());
    node.id = id;
    node.parent = Some(parent);
    node.expanded = false;
    self.nodes.push(node);
    self.nodes[parent.0].children.push(id);
    id
  }

  /// Stable-sort a node's children by start time, unset times first.
  pub(crate) fn sort_children(&mut self, parent: NodeId) {
    let mut children = std::mem::take(&mut self.nodes[parent.0].children);
    children.sort_by_key(|child| self.nodes[child.0].start);
    self.nodes[parent.0].children = children;
  }

  pub fn root(&self) -> &TreeNode {
    &self.nodes[self.root.0]
  }

  pub fn root_id(&self) -> NodeId {
    self.root
  }

  pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
    self.nodes.get(id.0)
  }

  pub fn parent(&self, id: NodeId) -> Option<&TreeNode> {
    self.get(id)?.parent.and_then(|parent| self.get(parent))
  }

  pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> {
    self
      .get(id)
      .map(|node| node.children.as_slice())
      .unwrap_or(&[])
      .iter()
      .map(|child| &self.nodes[child.0])
  }

  /// All nodes in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
    self.nodes.iter()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Rows to display: a pre-order walk from the root that does not descend
  /// into collapsed nodes.
  pub fn visible_nodes(&self) -> Vec<&TreeNode> {
    self.visible_from(self.root)
  }

  /// Like [`Self::visible_nodes`], starting at `start`.
  pub fn visible_from(&self, start: NodeId) -> Vec<&TreeNode> {
    let mut visible = Vec::new();
    if self.get(start).is_none() {
      return visible;
    }

    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
      let node = &self.nodes[id.0];
      visible.push(node);
      if node.expanded {
        stack.extend(node.children.iter().rev().copied());
      }
    }
    visible
  }

  /// Flip a node's expanded flag. Returns the new state, or `None` for an
  /// unknown id.
  pub fn toggle(&mut self, id: NodeId) -> Option<bool> {
    let node = self.nodes.get_mut(id.0)?;
    node.expanded = !node.expanded;
    Some(node.expanded)
  }

  pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
    if let Some(node) = self.nodes.get_mut(id.0) {
      node.expanded = expanded;
    }
  }

  pub fn expand_all(&mut self) {
    for node in &mut self.nodes {
      node.expanded = true;
    }
  }

  /// Collapse every node except the root.
  pub fn collapse_all(&mut self) {
    for node in &mut self.nodes {
      node.expanded = node.id == self.root;
    }
  }
}

impl Index<NodeId> for CallTree {
  type Output = TreeNode;

  fn index(&self, id: NodeId) -> &TreeNode {
    &self.nodes[id.0]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::node::NodeType;

  fn sample_tree() -> (CallTree, NodeId, NodeId, NodeId) {
    let mut tree = CallTree::with_root(TreeNode::new("wf".to_string(), NodeType::Workflow, 0));
    let root = tree.root_id();
    let a = tree.push_child(root, TreeNode::new("a".to_string(), NodeType::Call, 1));
    let a1 = tree.push_child(a, TreeNode::new("a [shard 0]".to_string(), NodeType::Shard, 2));
    let b = tree.push_child(root, TreeNode::new("b".to_string(), NodeType::Call, 1));
    (tree, a, a1, b)
  }

  fn names(nodes: Vec<&TreeNode>) -> Vec<&str> {
    nodes.into_iter().map(|n| n.name.as_str()).collect()
  }

  #[test]
  fn test_root_starts_expanded_children_collapsed() {
    let (tree, a, a1, b) = sample_tree();
    assert!(tree.root().expanded);
    assert!(!tree[a].expanded);
    assert!(!tree[a1].expanded);
    assert!(!tree[b].expanded);
    assert_eq!(tree.len(), 4);
  }

  #[test]
  fn test_visible_nodes_honor_expansion() {
    let (mut tree, a, _, _) = sample_tree();
    assert_eq!(names(tree.visible_nodes()), vec!["wf", "a", "b"]);

    assert_eq!(tree.toggle(a), Some(true));
    assert_eq!(names(tree.visible_nodes()), vec!["wf", "a", "a [shard 0]", "b"]);

    tree.collapse_all();
    assert_eq!(names(tree.visible_nodes()), vec!["wf", "a", "b"]);

    tree.set_expanded(tree.root_id(), false);
    assert_eq!(names(tree.visible_nodes()), vec!["wf"]);
  }

  #[test]
  fn test_parent_links() {
    let (tree, a, a1, _) = sample_tree();
    assert_eq!(tree.parent(a1).map(|n| n.id), Some(a));
    assert!(tree.parent(tree.root_id()).is_none());
    assert_eq!(tree.children(a).count(), 1);
  }

  #[test]
  fn test_unknown_ids() {
    let (mut tree, _, _, _) = sample_tree();
    let missing = NodeId(99);
    assert!(tree.get(missing).is_none());
    assert!(tree.toggle(missing).is_none());
    assert!(tree.visible_from(missing).is_empty());
    assert_eq!(tree.children(missing).count(), 0);
  }
}
