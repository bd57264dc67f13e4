//! One status row per top-level call.

use serde::Serialize;
use shardscope_metadata::{ExecutionStatus, WorkflowMetadata, task_name};

use crate::aggregate::{aggregate_status, group_shards, latest_attempt};

/// Status overview of one call, as shown in a workflow's call table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSummary {
  pub call_name: String,
  pub task_name: String,
  /// Whether any attempt ran as a shard of a scatter.
  pub is_scatter: bool,
  pub shard_count: usize,
  /// Shards whose collapsed status is `Done`.
  pub done: usize,
  /// Shards whose collapsed status is `Failed`.
  pub failed: usize,
  /// Shards whose collapsed status is `Running`.
  pub running: usize,
  pub status: ExecutionStatus,
  /// Whether every shard's latest attempt was served from the call cache.
  pub cache_hit: bool,
}

impl CallSummary {
  /// `"Task"`, or `"Task (Scatter)"` for scattered calls.
  pub fn label(&self) -> String {
    if self.is_scatter {
      format!("{} (Scatter)", self.task_name)
    } else {
      self.task_name.clone()
    }
  }

  /// The status column: the plain status for single calls, shard counts such
  /// as `"2/2 Done | 0 Failed"` for scatters.
  pub fn status_text(&self) -> String {
    if self.is_scatter {
      format!(
        "{}/{} Done | {} Failed",
        self.done, self.shard_count, self.failed
      )
    } else {
      self.status.to_string()
    }
  }
}

/// Summarize every call of `metadata`, in call name order.
pub fn call_summaries(metadata: &WorkflowMetadata) -> Vec<CallSummary> {
  metadata
    .calls
    .iter()
    .map(|(call_name, attempts)| {
      let shards = group_shards(attempts);
      let shard_statuses: Vec<ExecutionStatus> = shards
        .values()
        .map(|shard| aggregate_status(shard.iter().map(|a| &a.execution_status)))
        .collect();
      let count = |wanted: &ExecutionStatus| shard_statuses.iter().filter(|s| *s == wanted).count();

      let is_scatter = attempts.iter().any(|a| a.shard_index >= 0);
      // Single calls report their latest attempt as-is, so statuses outside the
      // aggregated set (queued, aborted) stay visible.
      let status = if is_scatter {
        aggregate_status(&shard_statuses)
      } else {
        let all: Vec<_> = attempts.iter().collect();
        latest_attempt(&all)
          .map(|latest| latest.execution_status.clone())
          .unwrap_or_default()
      };

      let cache_hit = !shards.is_empty()
        && shards.values().all(|shard| {
          shard
            .iter()
            .max_by_key(|a| a.attempt)
            .is_some_and(|latest| latest.is_cache_hit())
        });

      CallSummary {
        call_name: call_name.clone(),
        task_name: task_name(call_name).to_string(),
        is_scatter,
        shard_count: shards.len(),
        done: count(&ExecutionStatus::Done),
        failed: count(&ExecutionStatus::Failed),
        running: count(&ExecutionStatus::Running),
        status,
        cache_hit,
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use shardscope_metadata::CallDetails;

  use super::*;

  fn attempt(shard_index: i64, attempt: i64, status: ExecutionStatus) -> CallDetails {
    CallDetails {
      shard_index,
      attempt,
      execution_status: status,
      ..Default::default()
    }
  }

  #[test]
  fn test_scatter_counts_collapsed_shards() {
    let mut metadata = WorkflowMetadata::default();
    metadata.calls.insert(
      "Wf.work".to_string(),
      vec![
        attempt(0, 1, ExecutionStatus::Preempted),
        attempt(0, 2, ExecutionStatus::Done),
        attempt(1, 1, ExecutionStatus::Failed),
        attempt(2, 1, ExecutionStatus::Done),
      ],
    );

    let summaries = call_summaries(&metadata);
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.label(), "work (Scatter)");
    assert_eq!(summary.shard_count, 3);
    assert_eq!(summary.status_text(), "2/3 Done | 1 Failed");
    assert_eq!(summary.status, ExecutionStatus::Done);
  }

  #[test]
  fn test_single_call_shows_status() {
    let mut metadata = WorkflowMetadata::default();
    metadata.calls.insert(
      "Wf.single".to_string(),
      vec![attempt(-1, 1, ExecutionStatus::Running)],
    );

    let summary = &call_summaries(&metadata)[0];
    assert!(!summary.is_scatter);
    assert_eq!(summary.label(), "single");
    assert_eq!(summary.status_text(), "Running");
    assert!(!summary.cache_hit);
  }

  #[test]
  fn test_single_call_keeps_unaggregated_status() {
    let mut metadata = WorkflowMetadata::default();
    metadata.calls.insert(
      "Wf.queued".to_string(),
      vec![attempt(-1, 1, ExecutionStatus::QueuedInCromwell)],
    );
    metadata.calls.insert(
      "Wf.aborted".to_string(),
      vec![attempt(-1, 1, ExecutionStatus::parse("Aborted"))],
    );
    metadata.calls.insert(
      "Wf.retried".to_string(),
      vec![
        attempt(-1, 1, ExecutionStatus::Preempted),
        attempt(-1, 2, ExecutionStatus::QueuedInCromwell),
      ],
    );
    metadata.calls.insert("Wf.pending".to_string(), vec![]);

    let summaries = call_summaries(&metadata);
    let status_of = |task: &str| {
      summaries
        .iter()
        .find(|s| s.task_name == task)
        .map(|s| s.status_text())
        .unwrap()
    };

    assert_eq!(status_of("queued"), "QueuedInCromwell");
    assert_eq!(status_of("aborted"), "Aborted");
    assert_eq!(status_of("retried"), "QueuedInCromwell");
    assert_eq!(status_of("pending"), "");
  }
}
