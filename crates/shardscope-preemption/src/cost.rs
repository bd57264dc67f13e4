//! Resource cost of a single attempt.

use crate::types::CallData;

/// Cost of one attempt in resource-hours (or currency when the VM price is
/// known).
///
/// With a known hourly VM price the cost is `price x hours`; otherwise it is
/// `cpu x memory_gb x hours`. Unknown CPU and memory count as 1 and the
/// duration never drops below `min_duration_hours`. A product that overflows
/// falls back to plain hours, so the result is always finite.
pub fn attempt_cost(call: &CallData, min_duration_hours: f64) -> f64 {
  let hours = if call.duration_hours.is_finite() {
    call.duration_hours.max(min_duration_hours)
  } else {
    min_duration_hours
  };

  let cost = if call.vm_cost_per_hour.is_finite() && call.vm_cost_per_hour > 0.0 {
    call.vm_cost_per_hour * hours
  } else {
    positive_or_one(call.cpu) * positive_or_one(call.memory_gb) * hours
  };

  if cost.is_finite() { cost } else { hours }
}

/// Sum that saturates at `f64::MAX` instead of overflowing to infinity.
pub(crate) fn saturating_add(a: f64, b: f64) -> f64 {
  (a + b).min(f64::MAX)
}

fn positive_or_one(value: f64) -> f64 {
  if value.is_finite() && value > 0.0 {
    value
  } else {
    1.0
  }
}
