//! Workflow-level preemption rollup.

use std::collections::BTreeMap;

use tracing::{info, instrument};

use crate::config::AnalyzerConfig;
use crate::cost::{attempt_cost, saturating_add};
use crate::shard::{group_by_shard, stats_for_group};
use crate::types::{CallData, ProblematicTask, WorkflowPreemptionSummary};

/// Analyze a workflow with the default [`AnalyzerConfig`].
pub fn analyze_workflow(
  workflow_id: &str,
  workflow_name: &str,
  calls: &BTreeMap<String, Vec<CallData>>,
) -> WorkflowPreemptionSummary {
  analyze_workflow_with(&AnalyzerConfig::default(), workflow_id, workflow_name, calls)
}

/// Analyze a workflow's flattened calls.
///
/// `calls` maps task name to every attempt of every shard of that task.
#[instrument(name = "analyze_workflow", skip(config, calls), fields(tasks = calls.len()))]
pub fn analyze_workflow_with(
  config: &AnalyzerConfig,
  workflow_id: &str,
  workflow_name: &str,
  calls: &BTreeMap<String, Vec<CallData>>,
) -> WorkflowPreemptionSummary {
  let mut total_tasks = 0;
  let mut preemptible_tasks = 0;
  let mut total_attempts = 0u32;
  let mut total_preemptions = 0u32;
  let mut efficiency_sum = 0.0;
  let mut total_cost = 0.0;
  let mut wasted_cost = 0.0;
  let mut problematic_tasks = Vec::new();

  for (task_name, attempts) in calls {
    let shards = group_by_shard(attempts);
    if shards.is_empty() {
      continue;
    }

    let mut task = ProblematicTask {
      task_name: task_name.clone(),
      shard_count: shards.len(),
      total_attempts: 0,
      preempted_count: 0,
      efficiency_score: 0.0,
      total_cost: 0.0,
      wasted_cost: 0.0,
      is_preemptible: false,
      max_preemptible: 0,
    };
    let mut task_efficiency_sum = 0.0;

    for group in shards.values() {
      let stats = stats_for_group(group);
      let costs: Vec<f64> = group
        .iter()
        .map(|call| attempt_cost(call, config.min_duration_hours))
        .collect();
      let shard_total = costs.iter().copied().fold(0.0, saturating_add);
      // The final attempt is the one that counted; everything before it was
      // superseded.
      let shard_wasted = costs[..costs.len() - 1]
        .iter()
        .copied()
        .fold(0.0, saturating_add);

      task.total_attempts += stats.total_attempts;
      task.preempted_count += stats.preempted_count;
      task.total_cost = saturating_add(task.total_cost, shard_total);
      task.wasted_cost = saturating_add(task.wasted_cost, shard_wasted);
      task.is_preemptible |= stats.is_preemptible;
      task.max_preemptible = task.max_preemptible.max(stats.max_preemptible);
      task_efficiency_sum += stats.efficiency_score;

      total_tasks += 1;
      if stats.is_preemptible {
        preemptible_tasks += 1;
      }
      efficiency_sum += stats.efficiency_score;
    }

    task.efficiency_score = task_efficiency_sum / shards.len() as f64;

    total_attempts += task.total_attempts;
    total_preemptions += task.preempted_count;
    total_cost = saturating_add(total_cost, task.total_cost);
    wasted_cost = saturating_add(wasted_cost, task.wasted_cost);

    if task.efficiency_score < config.problematic_efficiency_threshold || task.preempted_count > 0 {
      problematic_tasks.push(task);
    }
  }

  problematic_tasks.sort_by(|a, b| {
    b.wasted_cost
      .total_cmp(&a.wasted_cost)
      .then_with(|| a.task_name.cmp(&b.task_name))
  });

  let overall_efficiency = if total_tasks > 0 {
    efficiency_sum / total_tasks as f64
  } else {
    1.0
  };

  let ratio = wasted_cost / total_cost;
  let cost_efficiency = if total_cost > 0.0 && ratio.is_finite() {
    (1.0 - ratio).clamp(0.0, 1.0)
  } else {
    1.0
  };

  info!(
    workflow_id = %workflow_id,
    total_tasks,
    total_preemptions,
    problematic = problematic_tasks.len(),
    cost_efficiency,
    "preemption_analyzed"
  );

  WorkflowPreemptionSummary {
    workflow_id: workflow_id.to_string(),
    workflow_name: workflow_name.to_string(),
    total_tasks,
    preemptible_tasks,
    total_attempts,
    total_preemptions,
    overall_efficiency,
    total_cost,
    wasted_cost,
    cost_efficiency,
    problematic_tasks,
  }
}
