use std::fmt;

use serde::{Serialize, Serializer};

/// Execution status of a call attempt as reported by the engine.
///
/// Statuses outside the known vocabulary are kept verbatim in
/// [`ExecutionStatus::Other`], so a workflow-level status such as `Succeeded`
/// round-trips through [`ExecutionStatus::as_str`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ExecutionStatus {
  /// No status observed yet (empty string).
  #[default]
  Unset,
  QueuedInCromwell,
  Running,
  Done,
  Failed,
  Preempted,
  RetryableFailure,
  /// The status could not be determined from the attempts.
  Unknown,
  Other(String),
}

impl ExecutionStatus {
  pub fn parse(value: &str) -> Self {
    match value {
      "" => Self::Unset,
      "QueuedInCromwell" => Self::QueuedInCromwell,
      "Running" => Self::Running,
      "Done" => Self::Done,
      "Failed" => Self::Failed,
      "Preempted" => Self::Preempted,
      "RetryableFailure" => Self::RetryableFailure,
      "Unknown" => Self::Unknown,
      other => Self::Other(other.to_string()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::Unset => "",
      Self::QueuedInCromwell => "QueuedInCromwell",
      Self::Running => "Running",
      Self::Done => "Done",
      Self::Failed => "Failed",
      Self::Preempted => "Preempted",
      Self::RetryableFailure => "RetryableFailure",
      Self::Unknown => "Unknown",
      Self::Other(other) => other,
    }
  }

  /// `Preempted` or `RetryableFailure`: the engine gave up on this attempt
  /// and scheduled another.
  pub fn is_retried(&self) -> bool {
    matches!(self, Self::Preempted | Self::RetryableFailure)
  }
}

impl From<&str> for ExecutionStatus {
  fn from(value: &str) -> Self {
    Self::parse(value)
  }
}

impl fmt::Display for ExecutionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Serialize for ExecutionStatus {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}
