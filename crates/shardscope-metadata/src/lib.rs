//! Shardscope Metadata
//!
//! This crate turns the JSON metadata document a Cromwell-style workflow engine
//! reports for an execution into a typed [`WorkflowMetadata`] value.
//!
//! The engine's schema drifts between versions, so decoding is lenient: any
//! field that is missing or has an unexpected type decodes to its zero value.
//! Only a document that is not a JSON object at all is rejected with a
//! [`DecodeError`].
//!
//! Embedded `subWorkflowMetadata` documents are decoded recursively, and every
//! decoded call attempt carries the [`PreemptionStats`] of its shard.
//!
//! # Usage
//!
//! ```ignore
//! let metadata = shardscope_metadata::decode(&bytes)?;
//! println!("{} ({}): {} calls", metadata.name, metadata.status, metadata.calls.len());
//!
//! let summary = metadata.preemption_summary(&AnalyzerConfig::default());
//! ```

mod decode;
mod error;
mod fields;
mod flatten;
mod resources;
mod status;
mod types;

pub use decode::{decode, decode_value};
pub use error::DecodeError;
pub use fields::parse_time;
pub use resources::{parse_cpu, parse_disk_gb, parse_memory_gb};
pub use status::ExecutionStatus;
pub use types::{
  CallCaching, CallDetails, ExecutionEvent, Failure, RuntimeAttributes, SubmittedFiles,
  WorkflowMetadata, task_name,
};

pub use shardscope_preemption::{AnalyzerConfig, PreemptionStats, WorkflowPreemptionSummary};
