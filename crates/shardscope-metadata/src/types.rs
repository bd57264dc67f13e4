use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use shardscope_preemption::PreemptionStats;

use crate::status::ExecutionStatus;

/// The task name of a fully qualified call name: the part after the last `.`.
///
/// `"HelloHere.SayHello"` becomes `"SayHello"`; a name without dots is
/// returned unchanged.
pub fn task_name(call_name: &str) -> &str {
  call_name
    .rsplit_once('.')
    .map(|(_, task)| task)
    .unwrap_or(call_name)
}

/// One workflow execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowMetadata {
  pub id: String,
  pub name: String,
  pub status: String,
  pub start: Option<DateTime<Utc>>,
  pub end: Option<DateTime<Utc>>,
  pub workflow_root: String,
  pub workflow_log: String,
  pub language: String,
  pub language_version: String,
  pub submitted_files: SubmittedFiles,
  /// Call name to every attempt of every shard of that call.
  pub calls: BTreeMap<String, Vec<CallDetails>>,
  pub inputs: Map<String, Value>,
  pub outputs: Map<String, Value>,
  pub labels: BTreeMap<String, String>,
  pub failures: Vec<Failure>,
}

impl WorkflowMetadata {
  /// Wall-clock duration, when both ends are known.
  pub fn duration(&self) -> Option<Duration> {
    span(self.start, self.end)
  }

  /// Every failure message in the cause chain, depth first.
  pub fn failure_messages(&self) -> Vec<&str> {
    let mut messages = Vec::new();
    for failure in &self.failures {
      failure.collect_messages(&mut messages);
    }
    messages
  }

  /// Total number of attempts across all calls, not counting sub-workflows.
  pub fn attempt_count(&self) -> usize {
    self.calls.values().map(Vec::len).sum()
  }
}

/// Source documents submitted with the workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmittedFiles {
  pub workflow: String,
  pub inputs: String,
  pub options: String,
}

/// One attempt of one shard of one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallDetails {
  /// `-1` when the call is not scattered.
  pub shard_index: i64,
  pub attempt: i64,
  pub job_id: String,
  pub execution_status: ExecutionStatus,
  pub backend_status: String,
  pub return_code: i64,
  pub start: Option<DateTime<Utc>>,
  pub end: Option<DateTime<Utc>>,
  pub vm_start_time: Option<DateTime<Utc>>,
  pub vm_end_time: Option<DateTime<Utc>>,
  pub command_line: String,
  pub backend: String,
  pub call_root: String,
  pub stdout: String,
  pub stderr: String,
  pub monitoring_log: String,
  pub docker_image_used: String,
  pub compressed_docker_size: i64,
  pub sub_workflow_id: String,
  pub vm_cost_per_hour: f64,
  pub runtime: RuntimeAttributes,
  pub call_caching: CallCaching,
  pub inputs: Map<String, Value>,
  pub outputs: Map<String, Value>,
  pub labels: BTreeMap<String, String>,
  pub execution_events: Vec<ExecutionEvent>,
  pub sub_workflow_metadata: Option<Box<WorkflowMetadata>>,
  /// Retry statistics of this attempt's shard, attached during decoding.
  pub preemption_stats: Option<PreemptionStats>,
}

impl CallDetails {
  /// Whether this attempt launched a sub-workflow.
  pub fn is_sub_workflow(&self) -> bool {
    !self.sub_workflow_id.is_empty() || self.sub_workflow_metadata.is_some()
  }

  pub fn is_cache_hit(&self) -> bool {
    self.call_caching.hit
  }

  /// Wall-clock duration, when both ends are known.
  pub fn duration(&self) -> Option<Duration> {
    span(self.start, self.end)
  }

  /// Time the backend VM was up, when both ends are known.
  pub fn vm_duration(&self) -> Option<Duration> {
    span(self.vm_start_time, self.vm_end_time)
  }
}

/// Runtime attributes as reported, kept in string form.
///
/// Use [`crate::parse_cpu`], [`crate::parse_memory_gb`] and
/// [`crate::parse_disk_gb`] for numeric values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuntimeAttributes {
  pub cpu: String,
  pub memory: String,
  pub disks: String,
  pub preemptible: String,
  pub zones: String,
  pub docker: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallCaching {
  pub hit: bool,
  pub result: String,
}

/// A timed step of an attempt's lifecycle (pulling the image, running the
/// command, delocalizing outputs, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionEvent {
  pub description: String,
  pub start: Option<DateTime<Utc>>,
  pub end: Option<DateTime<Utc>>,
}

/// A failure and the failures that caused it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Failure {
  pub message: String,
  pub caused_by: Vec<Failure>,
}

impl Failure {
  fn collect_messages<'a>(&'a self, messages: &mut Vec<&'a str>) {
    if !self.message.is_empty() {
      messages.push(&self.message);
    }
    for cause in &self.caused_by {
      cause.collect_messages(messages);
    }
  }
}

fn span(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<Duration> {
  match (start, end) {
    (Some(start), Some(end)) if end >= start => Some(end - start),
    _ => None,
  }
}
