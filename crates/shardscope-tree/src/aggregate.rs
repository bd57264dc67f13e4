//! Status aggregation across attempts and shards.

use std::collections::BTreeMap;

use shardscope_metadata::{CallDetails, ExecutionStatus};

/// Collapse several statuses into one.
///
/// Priority, highest first:
/// 1. any `Running`: an in-flight retry is still running, whatever happened
///    before it;
/// 2. any `Done`: a successful retry overrides earlier failures and
///    preemptions;
/// 3. any `Failed`;
/// 4. all `Preempted` or `RetryableFailure`: `Preempted`;
/// 5. otherwise `Unknown`, including when there are no statuses at all.
pub fn aggregate_status<'a, I>(statuses: I) -> ExecutionStatus
where
  I: IntoIterator<Item = &'a ExecutionStatus>,
{
  let mut any = false;
  let mut running = false;
  let mut done = false;
  let mut failed = false;
  let mut all_retried = true;

  for status in statuses {
    any = true;
    match status {
      ExecutionStatus::Running => running = true,
      ExecutionStatus::Done => done = true,
      ExecutionStatus::Failed => failed = true,
      _ => {}
    }
    all_retried &= status.is_retried();
  }

  if running {
    ExecutionStatus::Running
  } else if done {
    ExecutionStatus::Done
  } else if failed {
    ExecutionStatus::Failed
  } else if any && all_retried {
    ExecutionStatus::Preempted
  } else {
    ExecutionStatus::Unknown
  }
}

/// Group attempts by shard index in ascending order.
pub(crate) fn group_shards(attempts: &[CallDetails]) -> BTreeMap<i64, Vec<&CallDetails>> {
  let mut shards: BTreeMap<i64, Vec<&CallDetails>> = BTreeMap::new();
  for attempt in attempts {
    shards.entry(attempt.shard_index).or_default().push(attempt);
  }
  shards
}

/// The attempt with the highest attempt number; the later one wins ties.
pub(crate) fn latest_attempt<'a>(attempts: &[&'a CallDetails]) -> Option<&'a CallDetails> {
  attempts.iter().copied().max_by_key(|call| call.attempt)
}
