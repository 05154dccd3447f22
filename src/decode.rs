//! Helpers turning decoded `result` payloads into typed results.

use crate::errors::{IndexError, Result};
use crate::types::{QueryResult, VectorRecord};
use serde::Deserialize;
use serde_json::Value;

/// Decodes the plain acknowledgement string the service returns for
/// upsert/reset/delete-namespace style operations.
pub(crate) fn ack(value: Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| IndexError::Decode("expected an acknowledgement string".into()))
}

pub(crate) fn from_value<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

pub(crate) fn query_results(value: Value) -> Result<Vec<QueryResult>> {
    from_value(value)
}

pub(crate) fn batch_query_results(value: Value) -> Result<Vec<Vec<QueryResult>>> {
    from_value(value)
}

/// Fetch responses are position-aligned with the requested ids; unknown ids
/// come back as JSON `null`.
pub(crate) fn fetch_results(value: Value) -> Result<Vec<Option<VectorRecord>>> {
    from_value(value)
}

#[derive(Deserialize)]
struct ResumableStart {
    uuid: String,
    #[serde(default)]
    scores: Vec<QueryResult>,
}

/// Decodes the resumable-query creation response into the opaque session
/// handle and the first batch of results.
pub(crate) fn resumable_start(value: Value) -> Result<(String, Vec<QueryResult>)> {
    let start: ResumableStart = from_value(value)?;
    Ok((start.uuid, start.scores))
}
