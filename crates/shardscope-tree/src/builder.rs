//! Construction of the call tree from workflow metadata.

use shardscope_metadata::{CallDetails, ExecutionStatus, WorkflowMetadata, task_name};
use tracing::{debug, instrument};

use crate::aggregate::{aggregate_status, group_shards, latest_attempt};
use crate::node::{NodeId, NodeType, TreeNode};
use crate::tree::CallTree;

/// Build the full call tree of a workflow, descending into every embedded
/// sub-workflow.
#[instrument(name = "build_tree", skip(metadata), fields(workflow_id = %metadata.id))]
pub fn build_tree(metadata: &WorkflowMetadata) -> CallTree {
  let root = TreeNode {
    status: ExecutionStatus::parse(&metadata.status),
    ..TreeNode::new(metadata.name.clone(), NodeType::Workflow, 0)
  }
  .with_window(metadata.start, metadata.end);

  let mut tree = CallTree::with_root(root);
  let root_id = tree.root_id();
  tree.add_calls(root_id, metadata, 1);

  debug!(nodes = tree.len(), "call_tree_built");
  tree
}

impl CallTree {
  /// Attach a sub-workflow's calls under `node`, with the new rows at `depth`.
  ///
  /// Used when a sub-workflow was only known by id while building and its
  /// metadata has been resolved since.
  pub fn add_sub_workflow_children(
    &mut self,
    node: NodeId,
    sub_workflow: &WorkflowMetadata,
    depth: usize,
  ) {
    if self.get(node).is_none() {
      return;
    }

    debug!(
      node = node.index(),
      sub_workflow_id = %sub_workflow.id,
      calls = sub_workflow.calls.len(),
      "sub_workflow_children_attached"
    );
    self.add_calls(node, sub_workflow, depth);
  }

  /// Add one row per call of `metadata` under `parent`.
  pub(crate) fn add_calls(&mut self, parent: NodeId, metadata: &WorkflowMetadata, depth: usize) {
    for (call_name, attempts) in &metadata.calls {
      match attempts.as_slice() {
        [] => {
          let node = TreeNode {
            call_name: call_name.clone(),
            ..TreeNode::new(task_name(call_name).to_string(), NodeType::Call, depth)
          };
          self.push_child(parent, node);
        }
        [single] if single.shard_index == -1 => {
          self.add_single_call(parent, call_name, single, depth);
        }
        _ => self.add_scatter(parent, call_name, attempts, depth),
      }
    }
    self.sort_children(parent);
  }

  fn add_single_call(
    &mut self,
    parent: NodeId,
    call_name: &str,
    call: &CallDetails,
    depth: usize,
  ) {
    let node_type = if call.is_sub_workflow() {
      NodeType::SubWorkflow
    } else {
      NodeType::Call
    };

    let node = TreeNode {
      call_name: call_name.to_string(),
      status: call.execution_status.clone(),
      ..TreeNode::new(task_name(call_name).to_string(), node_type, depth)
    }
    .with_window(call.start, call.end)
    .with_call(call);

    let id = self.push_child(parent, node);
    if let Some(sub) = &call.sub_workflow_metadata {
      self.add_calls(id, sub, depth + 1);
    }
  }

  fn add_scatter(
    &mut self,
    parent: NodeId,
    call_name: &str,
    attempts: &[CallDetails],
    depth: usize,
  ) {
    let task = task_name(call_name);
    let start = attempts.iter().filter_map(|a| a.start).min();
    let end = attempts.iter().filter_map(|a| a.end).max();

    let scatter = TreeNode {
      call_name: call_name.to_string(),
      status: aggregate_status(attempts.iter().map(|a| &a.execution_status)),
      ..TreeNode::new(task.to_string(), NodeType::Call, depth)
    }
    .with_window(start, end);
    let scatter_id = self.push_child(parent, scatter);

    for (shard_index, shard_attempts) in group_shards(attempts) {
      let Some(latest) = latest_attempt(&shard_attempts) else {
        continue;
      };

      let mut name = format!("{task} [shard {shard_index}]");
      if shard_attempts.len() > 1 {
        name.push_str(&format!(" (attempt {})", latest.attempt));
      }

      let node_type = if latest.is_sub_workflow() {
        NodeType::SubWorkflow
      } else {
        NodeType::Shard
      };

      let node = TreeNode {
        call_name: call_name.to_string(),
        status: aggregate_status(shard_attempts.iter().map(|a| &a.execution_status)),
        ..TreeNode::new(name, node_type, depth + 1)
      }
      .with_window(latest.start, latest.end)
      .with_call(latest);

      let shard_id = self.push_child(scatter_id, node);
      if let Some(sub) = &latest.sub_workflow_metadata {
        self.add_calls(shard_id, sub, depth + 2);
      }
    }

    self.sort_children(scatter_id);
  }
}
