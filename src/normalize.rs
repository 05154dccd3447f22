//! Upsert input normalization: many accepted shapes, one canonical record.
//!
//! Each input converts independently to a [`VectorRecord`]; the batch is
//! then scanned once and classified as dense or raw-data. A batch that
//! mixes both modes is rejected here, before any request body is built.

use crate::errors::{IndexError, Result};
use crate::types::{UpsertInput, VectorRecord};
use serde_json::Value;

/// Request mode of a uniform upsert batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BatchMode {
    /// Every record carries vector values.
    Dense,
    /// Every record carries raw data embedded server-side.
    Raw,
}

/// Converts a batch of inputs into canonical records plus the batch mode.
///
/// Order and duplicate ids are preserved; the server is authoritative on
/// conflict resolution.
///
/// # Errors
/// [`IndexError::Validation`] on any malformed record or a mixed-mode batch.
pub(crate) fn normalize_batch(inputs: Vec<UpsertInput>) -> Result<(Vec<VectorRecord>, BatchMode)> {
    if inputs.is_empty() {
        return Err(IndexError::Validation("upsert batch is empty".into()));
    }

    let records = inputs
        .into_iter()
        .map(to_record)
        .collect::<Result<Vec<_>>>()?;

    let mode = if records[0].vector.is_some() {
        BatchMode::Dense
    } else {
        BatchMode::Raw
    };
    let uniform = records
        .iter()
        .all(|r| r.vector.is_some() == (mode == BatchMode::Dense));
    if !uniform {
        return Err(IndexError::Validation(
            "a batch cannot mix dense-vector records and raw-data records".into(),
        ));
    }

    Ok((records, mode))
}

/// Converts one input of any shape into a validated canonical record.
pub(crate) fn to_record(input: UpsertInput) -> Result<VectorRecord> {
    let record = match input {
        UpsertInput::Record(record) => record,
        UpsertInput::Fields(fields) => record_from_fields(&fields)?,
        UpsertInput::Dense {
            id,
            vector,
            metadata,
            unstructured_data,
        } => VectorRecord {
            id,
            vector: Some(vector),
            data: None,
            metadata,
            unstructured_data,
        },
        UpsertInput::Raw { id, data, metadata } => VectorRecord {
            id,
            vector: None,
            data: Some(data),
            metadata,
            unstructured_data: None,
        },
    };
    validate_record(record)
}

fn validate_record(record: VectorRecord) -> Result<VectorRecord> {
    if record.id.trim().is_empty() {
        return Err(IndexError::Validation("record is missing an `id`".into()));
    }
    match (&record.vector, &record.data) {
        (None, None) => Err(IndexError::Validation(format!(
            "record `{}`: either `vector` or `data` must be given",
            record.id
        ))),
        (Some(_), Some(_)) => Err(IndexError::Validation(format!(
            "record `{}`: `vector` and `data` cannot be given at the same time",
            record.id
        ))),
        _ => Ok(record),
    }
}

/// Builds a record from a keyed JSON mapping with the canonical field names.
fn record_from_fields(fields: &Value) -> Result<VectorRecord> {
    let map = fields
        .as_object()
        .ok_or_else(|| IndexError::Validation("upsert input must be a JSON object".into()))?;

    let id = map
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| IndexError::Validation("record is missing an `id`".into()))?
        .to_string();

    let vector = match map.get("vector") {
        Some(value) => Some(coerce_vector(&id, value)?),
        None => None,
    };
    let data = match map.get("data") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(IndexError::Validation(format!(
                "record `{id}`: `data` must be a string"
            )));
        }
        None => None,
    };
    let metadata = match map.get("metadata") {
        Some(Value::Object(obj)) => Some(obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        Some(_) => {
            return Err(IndexError::Validation(format!(
                "record `{id}`: `metadata` must be an object"
            )));
        }
        None => None,
    };
    let unstructured_data = match map.get("unstructuredData") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(IndexError::Validation(format!(
                "record `{id}`: `unstructuredData` must be a string"
            )));
        }
        None => None,
    };

    Ok(VectorRecord {
        id,
        vector,
        data,
        metadata,
        unstructured_data,
    })
}

/// Coerces a JSON value into an ordered sequence of floats.
fn coerce_vector(id: &str, value: &Value) -> Result<Vec<f32>> {
    let items = value.as_array().ok_or_else(|| {
        IndexError::Validation(format!("record `{id}`: `vector` must be an array of numbers"))
    })?;
    items
        .iter()
        .map(|item| {
            item.as_f64().map(|f| f as f32).ok_or_else(|| {
                IndexError::Validation(format!(
                    "record `{id}`: `vector` contains a non-numeric element"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;
    use serde_json::json;

    fn meta(key: &str, value: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert(key.to_string(), json!(value));
        m
    }

    #[test]
    fn dense_batch_from_all_shapes() {
        let inputs = vec![
            UpsertInput::from(("id1", vec![0.1, 0.2])),
            UpsertInput::from(("id2", vec![0.3, 0.4], meta("k", "v"))),
            UpsertInput::from(json!({"id": "id3", "vector": [0.5, 0.6]})),
            UpsertInput::from(VectorRecord::dense("id4", vec![0.7, 0.8])),
        ];

        let (records, mode) = normalize_batch(inputs).unwrap();
        assert_eq!(mode, BatchMode::Dense);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["id1", "id2", "id3", "id4"]);
        assert_eq!(records[1].metadata, Some(meta("k", "v")));
    }

    #[test]
    fn raw_batch_reports_raw_mode() {
        let inputs = vec![
            UpsertInput::from(("id1", "hello world")),
            UpsertInput::from(json!({"id": "id2", "data": "goodbye world"})),
            UpsertInput::from(VectorRecord::raw("id3", "again")),
        ];

        let (records, mode) = normalize_batch(inputs).unwrap();
        assert_eq!(mode, BatchMode::Raw);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.vector.is_none()));
    }

    #[test]
    fn mixed_batch_is_rejected() {
        let inputs = vec![
            UpsertInput::from(("id1", vec![0.1, 0.2])),
            UpsertInput::from(("id2", "raw text")),
        ];
        assert!(matches!(
            normalize_batch(inputs),
            Err(IndexError::Validation(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_forwarded_in_order() {
        let inputs = vec![
            UpsertInput::from(("dup", vec![0.1])),
            UpsertInput::from(("dup", vec![0.2])),
        ];
        let (records, _) = normalize_batch(inputs).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vector, Some(vec![0.1]));
        assert_eq!(records[1].vector, Some(vec![0.2]));
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(
            normalize_batch(Vec::new()),
            Err(IndexError::Validation(_))
        ));
    }

    #[test]
    fn missing_id_is_rejected() {
        let err = to_record(UpsertInput::from(json!({"vector": [0.1]}))).unwrap_err();
        assert!(matches!(err, IndexError::Validation(_)));
    }

    #[test]
    fn both_vector_and_data_are_rejected() {
        let record = VectorRecord {
            id: "id1".into(),
            vector: Some(vec![0.1]),
            data: Some("text".into()),
            metadata: None,
            unstructured_data: None,
        };
        assert!(to_record(UpsertInput::from(record)).is_err());

        let fields = json!({"id": "id1", "vector": [0.1], "data": "text"});
        assert!(to_record(UpsertInput::from(fields)).is_err());
    }

    #[test]
    fn neither_vector_nor_data_is_rejected() {
        assert!(to_record(UpsertInput::from(json!({"id": "id1"}))).is_err());
    }

    #[test]
    fn numeric_array_is_coerced_to_floats() {
        let record = to_record(UpsertInput::from(json!({"id": "id1", "vector": [1, 2.5]}))).unwrap();
        assert_eq!(record.vector, Some(vec![1.0, 2.5]));
    }

    #[test]
    fn non_numeric_vector_is_rejected() {
        assert!(to_record(UpsertInput::from(json!({"id": "a", "vector": "nope"}))).is_err());
        assert!(to_record(UpsertInput::from(json!({"id": "a", "vector": [0.1, "x"]}))).is_err());
    }

    #[test]
    fn dense_record_may_carry_unstructured_data() {
        let record = to_record(UpsertInput::from((
            "id1",
            vec![0.1],
            Metadata::new(),
            "payload",
        )))
        .unwrap();
        assert_eq!(record.unstructured_data.as_deref(), Some("payload"));
        assert!(record.data.is_none());
    }
}
