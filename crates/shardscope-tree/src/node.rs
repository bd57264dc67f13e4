use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use shardscope_metadata::{CallDetails, ExecutionStatus};

/// Index of a node inside its [`crate::CallTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
  pub fn index(self) -> usize {
    self.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeType {
  Workflow,
  Call,
  Shard,
  SubWorkflow,
}

/// One row of the call tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
  pub id: NodeId,
  /// Display name: the workflow name, a task name, or
  /// `"task [shard N] (attempt K)"`.
  pub name: String,
  /// Fully qualified call name; empty for the workflow root.
  pub call_name: String,
  pub node_type: NodeType,
  pub status: ExecutionStatus,
  pub start: Option<DateTime<Utc>>,
  pub end: Option<DateTime<Utc>>,
  #[serde(skip)]
  pub duration: Option<Duration>,
  pub expanded: bool,
  pub depth: usize,
  /// Lookup-only link to the parent row.
  pub parent: Option<NodeId>,
  pub children: Vec<NodeId>,
  pub sub_workflow_id: String,
  /// The attempt this row represents, without its embedded sub-workflow
  /// metadata (that is represented by the row's children instead).
  pub call: Option<CallDetails>,
}

impl TreeNode {
  pub(crate) fn new(name: String, node_type: NodeType, depth: usize) -> Self {
    Self {
      id: NodeId(0),
      name,
      call_name: String::new(),
      node_type,
      status: ExecutionStatus::Unset,
      start: None,
      end: None,
      duration: None,
      expanded: false,
      depth,
      parent: None,
      children: Vec::new(),
      sub_workflow_id: String::new(),
      call: None,
    }
  }

  /// Set the time window and derive the duration from it.
  pub(crate) fn with_window(
    mut self,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
  ) -> Self {
    self.start = start;
    self.end = end;
    self.duration = match (start, end) {
      (Some(start), Some(end)) if end >= start => Some(end - start),
      _ => None,
    };
    self
  }

  /// Attach the represented attempt.
  pub(crate) fn with_call(mut self, call: &CallDetails) -> Self {
    self.sub_workflow_id = call.sub_workflow_id.clone();
    self.call = Some(CallDetails {
      sub_workflow_metadata: None,
      ..call.clone()
    });
    self
  }

  pub fn has_children(&self) -> bool {
    !self.children.is_empty()
  }

  pub fn is_sub_workflow(&self) -> bool {
    self.node_type == NodeType::SubWorkflow
  }
}
