//! Recursive decoding of metadata documents.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use shardscope_preemption::shard_stats;
use tracing::debug;

use crate::error::DecodeError;
use crate::fields::{self, Object};
use crate::status::ExecutionStatus;
use crate::types::{
  CallCaching, CallDetails, ExecutionEvent, Failure, RuntimeAttributes, SubmittedFiles,
  WorkflowMetadata,
};

/// Decode a metadata document from raw JSON bytes.
///
/// Fails only when the bytes are not JSON or the top level is not an object.
/// Nesting depth is not limited; the stack grows on demand while parsing.
pub fn decode(bytes: &[u8]) -> Result<WorkflowMetadata, DecodeError> {
  let mut deserializer = serde_json::Deserializer::from_slice(bytes);
  deserializer.disable_recursion_limit();
  let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
  deserializer.end()?;
  decode_value(&value)
}

/// Decode a metadata document that has already been parsed.
pub fn decode_value(value: &Value) -> Result<WorkflowMetadata, DecodeError> {
  let obj = value.as_object().ok_or(DecodeError::NotAnObject {
    found: json_kind(value),
  })?;
  Ok(decode_workflow(obj))
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

fn decode_workflow(obj: &Object) -> WorkflowMetadata {
  let calls: BTreeMap<String, Vec<CallDetails>> = fields::object(obj, "calls")
    .map(|calls| {
      calls
        .iter()
        .map(|(name, attempts)| (name.clone(), decode_attempts(attempts)))
        .collect()
    })
    .unwrap_or_default();

  let metadata = WorkflowMetadata {
    id: fields::string(obj, "id"),
    name: fields::string(obj, "workflowName"),
    status: fields::string(obj, "status"),
    start: fields::time(obj, "start"),
    end: fields::time(obj, "end"),
    workflow_root: fields::string(obj, "workflowRoot"),
    workflow_log: fields::string(obj, "workflowLog"),
    language: fields::string(obj, "actualWorkflowLanguage"),
    language_version: fields::string(obj, "actualWorkflowLanguageVersion"),
    submitted_files: fields::object(obj, "submittedFiles")
      .map(|files| SubmittedFiles {
        workflow: fields::string(files, "workflow"),
        inputs: fields::string(files, "inputs"),
        options: fields::string(files, "options"),
      })
      .unwrap_or_default(),
    calls,
    inputs: fields::map(obj, "inputs"),
    outputs: fields::map(obj, "outputs"),
    labels: fields::string_map(obj, "labels"),
    failures: decode_failures(fields::array(obj, "failures")),
  };

  debug!(
    workflow_id = %metadata.id,
    workflow_name = %metadata.name,
    calls = metadata.calls.len(),
    "workflow_decoded"
  );

  metadata
}

fn decode_attempts(value: &Value) -> Vec<CallDetails> {
  let mut attempts: Vec<CallDetails> = value
    .as_array()
    .map(|items| {
      items
        .iter()
        .filter_map(Value::as_object)
        .map(decode_call)
        .collect()
    })
    .unwrap_or_default();

  attach_preemption_stats(&mut attempts);
  attempts
}

fn decode_call(obj: &Object) -> CallDetails {
  let sub_workflow_metadata = fields::object(obj, "subWorkflowMetadata")
    .map(|sub| Box::new(decode_workflow(sub)));

  let mut sub_workflow_id = fields::string(obj, "subWorkflowId");
  if sub_workflow_id.is_empty() {
    if let Some(sub) = &sub_workflow_metadata {
      sub_workflow_id = sub.id.clone();
    }
  }

  CallDetails {
    shard_index: fields::int_or(obj, "shardIndex", -1),
    attempt: fields::int(obj, "attempt"),
    job_id: fields::string(obj, "jobId"),
    execution_status: ExecutionStatus::parse(&fields::string(obj, "executionStatus")),
    backend_status: fields::string(obj, "backendStatus"),
    return_code: fields::int(obj, "returnCode"),
    start: fields::time(obj, "start"),
    end: fields::time(obj, "end"),
    vm_start_time: fields::time(obj, "vmStartTime"),
    vm_end_time: fields::time(obj, "vmEndTime"),
    command_line: fields::string(obj, "commandLine"),
    backend: fields::string(obj, "backend"),
    call_root: fields::string(obj, "callRoot"),
    stdout: fields::string(obj, "stdout"),
    stderr: fields::string(obj, "stderr"),
    monitoring_log: fields::string(obj, "monitoringLog"),
    docker_image_used: fields::string(obj, "dockerImageUsed"),
    compressed_docker_size: fields::int(obj, "compressedDockerSize"),
    sub_workflow_id,
    vm_cost_per_hour: fields::float(obj, "vmCostPerHour"),
    runtime: fields::object(obj, "runtimeAttributes")
      .map(decode_runtime)
      .unwrap_or_default(),
    call_caching: fields::object(obj, "callCaching")
      .map(|caching| CallCaching {
        hit: fields::boolean(caching, "hit"),
        result: fields::string(caching, "result"),
      })
      .unwrap_or_default(),
    inputs: fields::map(obj, "inputs"),
    outputs: fields::map(obj, "outputs"),
    labels: fields::string_map(obj, "labels"),
    execution_events: fields::array(obj, "executionEvents")
      .iter()
      .filter_map(Value::as_object)
      .map(|event| ExecutionEvent {
        description: fields::string(event, "description"),
        start: fields::time(event, "startTime"),
        end: fields::time(event, "endTime"),
      })
      .collect(),
    sub_workflow_metadata,
    preemption_stats: None,
  }
}

fn decode_runtime(obj: &Object) -> RuntimeAttributes {
  RuntimeAttributes {
    cpu: fields::scalar_string(obj, "cpu"),
    memory: fields::scalar_string(obj, "memory"),
    disks: fields::scalar_string(obj, "disks"),
    preemptible: fields::scalar_string(obj, "preemptible"),
    zones: fields::scalar_string(obj, "zones"),
    docker: fields::scalar_string(obj, "docker"),
  }
}

fn decode_failures(items: &[Value]) -> Vec<Failure> {
  items
    .iter()
    .filter_map(Value::as_object)
    .map(|failure| Failure {
      message: fields::string(failure, "message"),
      caused_by: decode_failures(fields::array(failure, "causedBy")),
    })
    .collect()
}

/// Apply each shard's stats to every attempt of that shard.
///
/// This is the only place decoded calls are modified after construction.
fn attach_preemption_stats(attempts: &mut [CallDetails]) {
  let data: Vec<_> = attempts.iter().map(CallDetails::to_call_data).collect();
  let stats = shard_stats(&data);
  for attempt in attempts.iter_mut() {
    attempt.preemption_stats = stats.get(&attempt.shard_index).copied();
  }
}
