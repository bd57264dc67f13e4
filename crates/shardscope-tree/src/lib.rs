//! Shardscope Tree
//!
//! This crate builds a navigable call tree from decoded workflow metadata, for
//! drill-down views of an execution:
//!
//! ```text
//! Workflow
//! ├── Call                       (single, non-scattered attempt)
//! ├── SubWorkflow                (call that launched a nested workflow)
//! │   └── Call ...
//! └── Call                       (scatter and/or retries)
//!     ├── Shard  "task [shard 0] (attempt 2)"
//!     └── SubWorkflow  "task [shard 1]"
//!         └── Call ...
//! ```
//!
//! Retry attempts of one shard never produce separate nodes; they collapse
//! into the shard's most recent attempt with a status aggregated by
//! [`aggregate_status`].
//!
//! Nodes live in an arena ([`CallTree`]) and refer to each other by [`NodeId`].
//! The tree is always fully built; the `expanded` flag only affects
//! [`CallTree::visible_nodes`].

mod aggregate;
mod builder;
mod node;
mod summary;
mod tree;

pub use aggregate::aggregate_status;
pub use builder::build_tree;
pub use node::{NodeId, NodeType, TreeNode};
pub use summary::{CallSummary, call_summaries};
pub use tree::CallTree;
