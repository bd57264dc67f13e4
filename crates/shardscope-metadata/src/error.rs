/// Error returned when a metadata document cannot be decoded at all.
///
/// Field-level problems never surface here; they decode to zero values.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
  /// The bytes are not valid JSON.
  #[error("invalid metadata JSON: {0}")]
  Json(#[from] serde_json::Error),

  /// The document is valid JSON but its top level is not an object.
  #[error("metadata document must be a JSON object, got {found}")]
  NotAnObject { found: &'static str },
}
