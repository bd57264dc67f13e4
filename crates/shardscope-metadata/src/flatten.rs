//! Flattening decoded metadata into preemption analyzer input.

use std::collections::BTreeMap;

use chrono::Duration;
use shardscope_preemption::{
  AnalyzerConfig, CallData, WorkflowPreemptionSummary, analyze_workflow_with,
};

use crate::resources::{parse_cpu, parse_memory_gb};
use crate::types::{CallDetails, WorkflowMetadata};

impl CallDetails {
  /// The analyzer's view of this attempt.
  ///
  /// The duration prefers the backend VM's lifetime and falls back to the
  /// call's own start and end.
  pub fn to_call_data(&self) -> CallData {
    CallData {
      shard_index: self.shard_index,
      attempt: self.attempt,
      preemptible: self.runtime.preemptible.clone(),
      cpu: parse_cpu(&self.runtime.cpu),
      memory_gb: parse_memory_gb(&self.runtime.memory),
      duration_hours: self
        .vm_duration()
        .or_else(|| self.duration())
        .map(hours)
        .unwrap_or(0.0),
      vm_cost_per_hour: self.vm_cost_per_hour,
    }
  }
}

fn hours(duration: Duration) -> f64 {
  duration.num_milliseconds() as f64 / 3_600_000.0
}

impl WorkflowMetadata {
  /// Every compute attempt in this workflow and its sub-workflows, keyed by
  /// call name.
  ///
  /// Attempts that launched a sub-workflow are replaced by the sub-workflow's
  /// own calls, keyed `"{parent_call}.{child_call}"`. All shards of a
  /// scattered sub-workflow call share one prefix, so their child calls merge
  /// into a single entry. Attempts that reference a sub-workflow only by id
  /// have no compute of their own and are skipped.
  pub fn preemption_calls(&self) -> BTreeMap<String, Vec<CallData>> {
    let mut calls = BTreeMap::new();
    collect_calls(self, None, &mut calls);
    calls
  }

  /// Run the preemption analyzer over [`Self::preemption_calls`].
  pub fn preemption_summary(&self, config: &AnalyzerConfig) -> WorkflowPreemptionSummary {
    analyze_workflow_with(config, &self.id, &self.name, &self.preemption_calls())
  }
}

fn collect_calls(
  metadata: &WorkflowMetadata,
  prefix: Option<&str>,
  out: &mut BTreeMap<String, Vec<CallData>>,
) {
  for (call_name, attempts) in &metadata.calls {
    let key = match prefix {
      Some(prefix) => format!("{prefix}.{call_name}"),
      None => call_name.clone(),
    };

    for attempt in attempts {
      match &attempt.sub_workflow_metadata {
        Some(sub) => collect_calls(sub, Some(&key), out),
        None if attempt.is_sub_workflow() => {}
        None => out
          .entry(key.clone())
          .or_default()
          .push(attempt.to_call_data()),
      }
    }
  }
}
