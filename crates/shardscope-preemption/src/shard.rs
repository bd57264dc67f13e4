//! Per-shard retry statistics.

use std::collections::BTreeMap;

use crate::types::{CallData, PreemptionStats};

/// Interpret a `preemptible` runtime attribute.
///
/// Returns `(is_preemptible, max_preemptible)`. Empty, `"false"` and `"0"` are
/// not preemptible, `"true"` allows a single preemptible attempt, and any other
/// integer is the engine's preemptible attempt ceiling. Strings that are none
/// of these are treated as not preemptible.
pub fn parse_preemptible(value: &str) -> (bool, u32) {
  let value = value.trim();
  if value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false") {
    return (false, 0);
  }
  if value.eq_ignore_ascii_case("true") {
    return (true, 1);
  }
  match value.parse::<u32>() {
    Ok(max) => (true, max),
    Err(_) => (false, 0),
  }
}

/// Score a shard's retry behavior in `[0, 1]`.
pub fn efficiency_score(
  total_attempts: u32,
  preempted_count: u32,
  is_preemptible: bool,
  max_preemptible: u32,
) -> f64 {
  if !is_preemptible {
    return 1.0;
  }

  let score = if max_preemptible > 0 {
    1.0 - f64::from(preempted_count) / f64::from(max_preemptible)
  } else if total_attempts > 0 {
    1.0 / f64::from(total_attempts)
  } else {
    1.0
  };

  score.clamp(0.0, 1.0)
}

/// Group attempts by shard index, each group sorted by ascending attempt.
pub(crate) fn group_by_shard(attempts: &[CallData]) -> BTreeMap<i64, Vec<&CallData>> {
  let mut shards: BTreeMap<i64, Vec<&CallData>> = BTreeMap::new();
  for attempt in attempts {
    shards.entry(attempt.shard_index).or_default().push(attempt);
  }
  for group in shards.values_mut() {
    group.sort_by_key(|a| a.attempt);
  }
  shards
}

/// Stats for one shard's attempts, already sorted by attempt.
pub(crate) fn stats_for_group(group: &[&CallData]) -> PreemptionStats {
  let total_attempts = u32::try_from(group.len()).unwrap_or(u32::MAX);
  let preempted_count = total_attempts.saturating_sub(1);
  let (is_preemptible, max_preemptible) = group
    .last()
    .map(|last| parse_preemptible(&last.preemptible))
    .unwrap_or((false, 0));

  PreemptionStats {
    total_attempts,
    preempted_count,
    is_preemptible,
    max_preemptible,
    efficiency_score: efficiency_score(
      total_attempts,
      preempted_count,
      is_preemptible,
      max_preemptible,
    ),
  }
}

/// Compute [`PreemptionStats`] for every shard among a task's attempts.
///
/// The result is keyed by shard index. Callers that own the attempts apply it
/// back onto their own records.
pub fn shard_stats(attempts: &[CallData]) -> BTreeMap<i64, PreemptionStats> {
  group_by_shard(attempts)
    .into_iter()
    .map(|(shard, group)| (shard, stats_for_group(&group)))
    .collect()
}
