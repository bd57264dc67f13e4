use serde::{Deserialize, Serialize};

/// One attempt of one shard, reduced to the fields the analyzer needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallData {
  /// Shard index, `-1` when the task is not scattered.
  pub shard_index: i64,
  /// 1-based attempt number.
  pub attempt: i64,
  /// Raw `preemptible` runtime attribute (`""`, `"false"`, `"true"`, `"3"`, ...).
  pub preemptible: String,
  /// Requested CPU count; zero means unknown.
  pub cpu: f64,
  /// Requested memory in gigabytes; zero means unknown.
  pub memory_gb: f64,
  /// Wall-clock duration of the attempt in hours; zero means unknown.
  pub duration_hours: f64,
  /// Hourly VM price reported by the backend; zero means unknown.
  pub vm_cost_per_hour: f64,
}

/// Retry statistics for a single shard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreemptionStats {
  pub total_attempts: u32,
  /// Every attempt before the final one counts as preempted.
  pub preempted_count: u32,
  pub is_preemptible: bool,
  pub max_preemptible: u32,
  pub efficiency_score: f64,
}

/// A task that lost attempts to preemption or scored below the efficiency
/// threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblematicTask {
  pub task_name: String,
  pub shard_count: usize,
  pub total_attempts: u32,
  pub preempted_count: u32,
  /// Mean efficiency over the task's shards.
  pub efficiency_score: f64,
  pub total_cost: f64,
  pub wasted_cost: f64,
  pub is_preemptible: bool,
  pub max_preemptible: u32,
}

/// Workflow-wide preemption and cost rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowPreemptionSummary {
  pub workflow_id: String,
  pub workflow_name: String,
  /// Distinct (task, shard) pairs.
  pub total_tasks: usize,
  /// Distinct (task, shard) pairs whose final attempt was preemptible.
  pub preemptible_tasks: usize,
  pub total_attempts: u32,
  pub total_preemptions: u32,
  pub overall_efficiency: f64,
  pub total_cost: f64,
  pub wasted_cost: f64,
  pub cost_efficiency: f64,
  /// Ordered by wasted cost, highest first.
  pub problematic_tasks: Vec<ProblematicTask>,
}
