use serde::{Deserialize, Serialize};

/// Tunables for the preemption analyzer.
///
/// Missing fields take their defaults when deserialized, so a config file only
/// needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
  /// Tasks whose mean shard efficiency falls below this value are reported as
  /// problematic even without preemptions.
  pub problematic_efficiency_threshold: f64,
  /// Lower bound applied to every attempt's duration when computing cost.
  pub min_duration_hours: f64,
}

impl Default for AnalyzerConfig {
  fn default() -> Self {
    Self {
      problematic_efficiency_threshold: 0.5,
      min_duration_hours: 0.01,
    }
  }
}
