//! Shardscope Preemption
//!
//! This crate scores how efficiently the shards of a workflow used their
//! preemption budget, and how much resource cost was spent on attempts that
//! were later superseded by a retry.
//!
//! The analyzer works on a flattened view of a workflow: a map from task name
//! to every [`CallData`] attempt of that task. Sub-workflow calls are expected
//! to be merged into the same map under `parentCall.childCall` names by the
//! caller (see `shardscope-metadata`).
//!
//! # Usage
//!
//! ```ignore
//! use shardscope_preemption::{analyze_workflow, CallData};
//!
//! let summary = analyze_workflow("wf-id", "MyWorkflow", &calls);
//! for task in &summary.problematic_tasks {
//!   println!("{}: wasted {:.2}", task.task_name, task.wasted_cost);
//! }
//! ```

mod analyzer;
mod config;
mod cost;
mod shard;
mod types;

pub use analyzer::{analyze_workflow, analyze_workflow_with};
pub use config::AnalyzerConfig;
pub use cost::attempt_cost;
pub use shard::{efficiency_score, parse_preemptible, shard_stats};
pub use types::{CallData, PreemptionStats, ProblematicTask, WorkflowPreemptionSummary};
