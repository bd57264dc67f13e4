//! Get-or-default accessors over a loosely typed JSON object.
//!
//! Every accessor is total: an absent key or a value of the wrong type yields
//! the zero value for the requested kind.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

pub(crate) type Object = Map<String, Value>;

/// Fallback layout for timestamps written without a zone, read as UTC.
const FALLBACK_TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse an engine timestamp.
///
/// Tries RFC 3339 first and then the zoneless layout. Returns `None` when
/// neither matches; callers treat that as "unset".
pub fn parse_time(value: &str) -> Option<DateTime<Utc>> {
  if let Ok(time) = DateTime::parse_from_rfc3339(value) {
    return Some(time.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(value, FALLBACK_TIME_LAYOUT)
    .ok()
    .map(|naive| naive.and_utc())
}

/// A string field. Non-strings yield `""`.
pub(crate) fn string(obj: &Object, key: &str) -> String {
  obj
    .get(key)
    .and_then(Value::as_str)
    .map(str::to_string)
    .unwrap_or_default()
}

/// A scalar rendered as a string: strings as-is, numbers and booleans via their
/// JSON text, arrays of scalars joined by a space. Anything else yields `""`.
pub(crate) fn scalar_string(obj: &Object, key: &str) -> String {
  obj.get(key).map(render_scalar).unwrap_or_default()
}

fn render_scalar(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Number(n) => n.to_string(),
    Value::Bool(b) => b.to_string(),
    Value::Array(items) => items
      .iter()
      .map(render_scalar)
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" "),
    _ => String::new(),
  }
}

/// An integer field, or `default` when absent or not a number.
///
/// Floating point numbers are truncated toward zero.
pub(crate) fn int_or(obj: &Object, key: &str, default: i64) -> i64 {
  match obj.get(key) {
    Some(Value::Number(n)) => n
      .as_i64()
      .or_else(|| n.as_f64().map(|f| f as i64))
      .unwrap_or(default),
    _ => default,
  }
}

/// An integer field. Non-numbers yield `0`.
pub(crate) fn int(obj: &Object, key: &str) -> i64 {
  int_or(obj, key, 0)
}

/// A floating point field. Numeric strings are accepted; anything else yields
/// `0.0`.
pub(crate) fn float(obj: &Object, key: &str) -> f64 {
  match obj.get(key) {
    Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
    Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
    _ => 0.0,
  }
}

/// A boolean field. Non-booleans yield `false`.
pub(crate) fn boolean(obj: &Object, key: &str) -> bool {
  obj.get(key).and_then(Value::as_bool).unwrap_or_default()
}

/// A timestamp field. Missing, non-string, or unparsable values are unset.
pub(crate) fn time(obj: &Object, key: &str) -> Option<DateTime<Utc>> {
  obj.get(key).and_then(Value::as_str).and_then(parse_time)
}

/// A nested object, if present.
pub(crate) fn object<'a>(obj: &'a Object, key: &str) -> Option<&'a Object> {
  obj.get(key).and_then(Value::as_object)
}

/// A nested array. Non-arrays yield an empty slice.
pub(crate) fn array<'a>(obj: &'a Object, key: &str) -> &'a [Value] {
  obj
    .get(key)
    .and_then(Value::as_array)
    .map(Vec::as_slice)
    .unwrap_or(&[])
}

/// A nested object copied as-is. Non-objects yield an empty map.
pub(crate) fn map(obj: &Object, key: &str) -> Object {
  object(obj, key).cloned().unwrap_or_default()
}

/// A nested object of scalar values, e.g. labels.
pub(crate) fn string_map(obj: &Object, key: &str) -> BTreeMap<String, String> {
  object(obj, key)
    .map(|labels| {
      labels
        .iter()
        .map(|(k, v)| (k.clone(), render_scalar(v)))
        .collect()
    })
    .unwrap_or_default()
}
