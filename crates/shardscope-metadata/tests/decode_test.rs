//! Integration tests for decoding full metadata documents.

use proptest::prelude::*;
use serde_json::{Value, json};
use shardscope_metadata::{AnalyzerConfig, ExecutionStatus, decode, decode_value};

const HELLO_HERE: &[u8] = include_bytes!("../../../testdata/hello_here.json");

#[test]
fn test_decode_hello_here() {
  let metadata = decode(HELLO_HERE).expect("sample metadata should decode");

  assert_eq!(metadata.name, "HelloHere");
  assert_eq!(metadata.id, "8a2c2d3e-6c1b-4d2b-9a53-2f0f7e1c4d5a");
  assert_eq!(metadata.status, "Succeeded");
  assert_eq!(metadata.language, "WDL");
  assert_eq!(metadata.language_version, "1.0");
  assert!(metadata.submitted_files.workflow.contains("workflow HelloHere"));
  assert_eq!(metadata.inputs["someInput"], "world");
  assert_eq!(
    metadata.labels["cromwell-workflow-id"],
    "cromwell-8a2c2d3e-6c1b-4d2b-9a53-2f0f7e1c4d5a"
  );
  assert_eq!(metadata.duration().map(|d| d.num_seconds()), Some(50));

  let names: Vec<&str> = metadata.calls.keys().map(String::as_str).collect();
  assert_eq!(
    names,
    vec![
      "HelloHere.RunHelloWorkflows",
      "HelloHere.SayGoodbye",
      "HelloHere.SayHello",
      "HelloHere.SayHelloCache",
    ]
  );

  let say_hello = &metadata.calls["HelloHere.SayHello"][0];
  assert_eq!(say_hello.execution_status, ExecutionStatus::Done);
  assert_eq!(say_hello.shard_index, -1);
  assert_eq!(say_hello.job_id, "12345");
  assert_eq!(say_hello.runtime.memory, "2 GB");
  assert_eq!(say_hello.execution_events.len(), 1);
  assert_eq!(say_hello.execution_events[0].description, "RunningJob");
  assert!(!say_hello.is_cache_hit());

  assert!(metadata.calls["HelloHere.SayHelloCache"][0].is_cache_hit());
}

#[test]
fn test_decode_is_idempotent() {
  let first = decode(HELLO_HERE).unwrap();
  let second = decode(HELLO_HERE).unwrap();
  assert_eq!(first, second);
}

#[test]
fn test_scattered_sub_workflows_are_resolved() {
  let metadata = decode(HELLO_HERE).unwrap();
  let shards = &metadata.calls["HelloHere.RunHelloWorkflows"];
  assert_eq!(shards.len(), 2);

  for (index, shard) in shards.iter().enumerate() {
    assert_eq!(shard.shard_index, index as i64);
    let sub = shard.sub_workflow_metadata.as_ref().unwrap();
    assert_eq!(sub.name, "HelloWorld");
    assert_eq!(shard.sub_workflow_id, sub.id);
    assert_eq!(sub.calls["HelloWorld.SayHello"].len(), 1);

    // Stats are attached inside the sub-workflow too.
    let stats = sub.calls["HelloWorld.SayHello"][0].preemption_stats.unwrap();
    assert_eq!(stats.total_attempts, 1);
    assert!(stats.is_preemptible);
  }
}

#[test]
fn test_hello_here_preemption_summary() {
  let metadata = decode(HELLO_HERE).unwrap();
  let summary = metadata.preemption_summary(&AnalyzerConfig::default());

  assert_eq!(summary.workflow_name, "HelloHere");
  // SayHello, SayHelloCache, SayGoodbye and the two sub-workflow shards merged
  // under one prefixed name.
  assert_eq!(summary.total_tasks, 4);
  assert_eq!(summary.total_attempts, 5);
  assert_eq!(summary.total_preemptions, 1);
  assert_eq!(summary.problematic_tasks.len(), 1);
  assert_eq!(
    summary.problematic_tasks[0].task_name,
    "HelloHere.RunHelloWorkflows.HelloWorld.SayHello"
  );
}

fn nested_workflow(depth: usize) -> Value {
  let mut current = json!({
    "id": format!("wf-{depth}"),
    "workflowName": format!("Level{depth}"),
    "calls": {
      "Leaf.task": [{ "shardIndex": -1, "attempt": 1, "executionStatus": "Done" }]
    }
  });

  for level in (0..depth).rev() {
    let call_name = format!("Level{level}.inner");
    current = json!({
      "id": format!("wf-{level}"),
      "workflowName": format!("Level{level}"),
      "calls": {
        call_name: [{
          "shardIndex": -1,
          "attempt": 1,
          "executionStatus": "Done",
          "subWorkflowMetadata": current
        }]
      }
    });
  }

  current
}

fn assert_nested_decodes(depth: usize) {
  let bytes = serde_json::to_vec(&nested_workflow(depth)).unwrap();
  let metadata = decode(&bytes).unwrap();

  let mut current = &metadata;
  for level in 0..depth {
    let call = &current.calls[&format!("Level{level}.inner")][0];
    assert_eq!(call.sub_workflow_id, format!("wf-{}", level + 1));
    current = call.sub_workflow_metadata.as_ref().unwrap();
  }
  assert_eq!(current.name, format!("Level{depth}"));
  assert!(current.calls.contains_key("Leaf.task"));

  let calls = metadata.preemption_calls();
  assert_eq!(calls.len(), 1);
  let key = calls.keys().next().unwrap();
  assert!(key.starts_with("Level0.inner.Level1.inner."));
  assert!(key.ends_with(".Leaf.task"));
}

#[test]
fn test_deeply_nested_sub_workflows() {
  assert_nested_decodes(25);
}

#[test]
fn test_nesting_beyond_json_recursion_default() {
  // Four JSON levels per sub-workflow puts this well past 128.
  assert_nested_decodes(48);
}

#[test]
fn test_long_failure_chain() {
  let depth = 100;
  let mut failure = json!({ "message": format!("cause {depth}"), "causedBy": [] });
  for level in (0..depth).rev() {
    failure = json!({ "message": format!("cause {level}"), "causedBy": [failure] });
  }
  let document = json!({ "id": "wf", "status": "Failed", "failures": [failure] });

  let bytes = serde_json::to_vec(&document).unwrap();
  let metadata = decode(&bytes).unwrap();

  let messages = metadata.failure_messages();
  assert_eq!(messages.len(), depth + 1);
  assert_eq!(messages[0], "cause 0");
  assert_eq!(messages[depth], format!("cause {depth}"));
}

/// A scattered sub-workflow call whose every shard runs one non-scattered
/// child task.
fn scattered_sub_workflow(shards: usize) -> Value {
  let attempts: Vec<Value> = (0..shards)
    .map(|shard| {
      json!({
        "shardIndex": shard,
        "attempt": 1,
        "executionStatus": "Done",
        "subWorkflowMetadata": {
          "id": format!("child-{shard}"),
          "workflowName": "Child",
          "calls": {
            "Child.work": [{
              "shardIndex": -1,
              "attempt": 1,
              "executionStatus": "Done",
              "runtimeAttributes": { "preemptible": "2" }
            }]
          }
        }
      })
    })
    .collect();

  json!({
    "id": "main",
    "workflowName": "Main",
    "calls": { "Main.fan_out": attempts }
  })
}

#[test]
fn test_prefix_collision_across_dotted_names() {
  // "Main.a" + "b.c" and "Main.a.b" + "c" both flatten to "Main.a.b.c".
  let metadata = decode_value(&json!({
    "calls": {
      "Main.a": [{
        "shardIndex": -1, "attempt": 1,
        "subWorkflowMetadata": { "calls": { "b.c": [{ "shardIndex": -1, "attempt": 1 }] } }
      }],
      "Main.a.b": [{
        "shardIndex": -1, "attempt": 1,
        "subWorkflowMetadata": { "calls": { "c": [{ "shardIndex": -1, "attempt": 1 }] } }
      }]
    }
  }))
  .unwrap();

  let calls = metadata.preemption_calls();
  assert_eq!(calls.len(), 1);
  assert_eq!(calls["Main.a.b.c"].len(), 2);
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(32))]

  /// Every shard of a scattered sub-workflow flattens to the same prefixed name,
  /// so independent single-attempt children look like one retried shard.
  #[test]
  fn prop_scattered_sub_workflow_children_collide(shards in 1usize..8) {
    let metadata = decode_value(&scattered_sub_workflow(shards)).unwrap();
    let calls = metadata.preemption_calls();

    prop_assert_eq!(calls.len(), 1);
    prop_assert_eq!(calls["Main.fan_out.Child.work"].len(), shards);

    let summary = metadata.preemption_summary(&AnalyzerConfig::default());
    prop_assert_eq!(summary.total_tasks, 1);
    prop_assert_eq!(summary.total_attempts as usize, shards);
    prop_assert_eq!(summary.total_preemptions as usize, shards - 1);
  }

  #[test]
  fn prop_decode_never_fails_on_objects(
    entries in prop::collection::btree_map("[a-zA-Z]{1,12}", any::<i64>().prop_map(Value::from), 0..8)
  ) {
    let value = Value::Object(entries.into_iter().collect());
    prop_assert!(decode_value(&value).is_ok());
  }
}
