//! Pure request-body builders shared by the blocking and async surfaces.
//!
//! Everything here is transport-free: the builders validate input, pick the
//! base path, and emit the JSON body. Both `Index` and `AsyncIndex` are thin
//! wrappers over these functions, so the two surfaces cannot drift.

use crate::errors::{IndexError, Result};
use crate::paths::{
    QUERY_DATA_PATH, QUERY_PATH, RESUMABLE_QUERY_DATA_PATH, RESUMABLE_QUERY_PATH,
};
use crate::types::{FetchRequest, Metadata, MetadataUpdateMode, QueryRequest, RangeRequest, UpdateRequest};
use serde::Serialize;
use serde_json::Value;

/* ==========================
HTTP payloads
========================== */

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    top_k: u32,
    include_vectors: bool,
    include_metadata: bool,
    include_unstructured_data: bool,
    filter: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    vector: Option<&'a [f32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a str>,
    /// Only present on resumable-query creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    max_idle: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RangeBody<'a> {
    cursor: &'a str,
    limit: u32,
    include_vectors: bool,
    include_metadata: bool,
    include_unstructured_data: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchBody<'a> {
    ids: &'a [String],
    include_vectors: bool,
    include_metadata: bool,
    include_unstructured_data: bool,
}

#[derive(Serialize)]
struct DeleteBody {
    ids: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    vector: Option<&'a [f32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Metadata>,
    metadata_update_mode: MetadataUpdateMode,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResumableNextBody<'a> {
    uuid: &'a str,
    additional_k: u32,
}

#[derive(Serialize)]
struct ResumableEndBody<'a> {
    uuid: &'a str,
}

/* ==========================
Builders
========================== */

/// Builds a single query body and selects the base path by request mode.
///
/// # Errors
/// [`IndexError::Validation`] if neither or both of `vector`/`data` are set.
pub(crate) fn query_body(request: &QueryRequest) -> Result<(Value, &'static str)> {
    build_query(request, None, QUERY_PATH, QUERY_DATA_PATH)
}

/// Builds the creation body for a resumable query, carrying `maxIdle`.
pub(crate) fn resumable_start_body(
    request: &QueryRequest,
    max_idle_secs: u64,
) -> Result<(Value, &'static str)> {
    build_query(
        request,
        Some(max_idle_secs),
        RESUMABLE_QUERY_PATH,
        RESUMABLE_QUERY_DATA_PATH,
    )
}

fn build_query(
    request: &QueryRequest,
    max_idle: Option<u64>,
    vector_path: &'static str,
    data_path: &'static str,
) -> Result<(Value, &'static str)> {
    let (vector, data, path) = match (&request.vector, &request.data) {
        (None, None) => {
            return Err(IndexError::Validation(
                "either `vector` or `data` must be given".into(),
            ));
        }
        (Some(_), Some(_)) => {
            return Err(IndexError::Validation(
                "`vector` and `data` cannot be given at the same time".into(),
            ));
        }
        (Some(vector), None) => (Some(vector.as_slice()), None, vector_path),
        (None, Some(data)) => (None, Some(data.as_str()), data_path),
    };

    let body = QueryBody {
        top_k: request.top_k,
        include_vectors: request.include_vectors,
        include_metadata: request.include_metadata,
        include_unstructured_data: request.include_unstructured_data,
        filter: &request.filter,
        vector,
        data,
        max_idle,
    };
    Ok((serde_json::to_value(body)?, path))
}

/// Dispatch plan for a query batch.
pub(crate) enum BatchPlan {
    /// Singleton batches go through the single-query path; the server
    /// returns an unwrapped result for them, so the caller re-wraps.
    Single,
    /// Two or more requests, uniform in mode and namespace.
    Many {
        body: Value,
        base: &'static str,
        namespace: String,
    },
}

/// Validates a query batch and decides how to dispatch it.
///
/// # Errors
/// [`IndexError::Validation`] on an empty batch, differing namespaces, a
/// mode mix across requests, or any invalid member request.
pub(crate) fn plan_query_batch(requests: &[QueryRequest]) -> Result<BatchPlan> {
    let Some(first) = requests.first() else {
        return Err(IndexError::Validation("query batch is empty".into()));
    };
    if requests.iter().any(|r| r.namespace != first.namespace) {
        return Err(IndexError::Validation(
            "queries in a batch must share one namespace".into(),
        ));
    }
    if requests.len() == 1 {
        return Ok(BatchPlan::Single);
    }

    let (first_body, base) = query_body(first)?;
    let mut bodies = Vec::with_capacity(requests.len());
    bodies.push(first_body);
    for request in &requests[1..] {
        let (body, path) = query_body(request)?;
        if path != base {
            return Err(IndexError::Validation(
                "queries in a batch must all use `vector` or all use `data`".into(),
            ));
        }
        bodies.push(body);
    }

    Ok(BatchPlan::Many {
        body: Value::Array(bodies),
        base,
        namespace: first.namespace.clone(),
    })
}

/// Builds a range-scan body.
///
/// # Errors
/// [`IndexError::Validation`] when `limit` is zero.
pub(crate) fn range_body(request: &RangeRequest) -> Result<Value> {
    if request.limit == 0 {
        return Err(IndexError::Validation("limit must be greater than 0".into()));
    }
    let body = RangeBody {
        cursor: &request.cursor,
        limit: request.limit,
        include_vectors: request.include_vectors,
        include_metadata: request.include_metadata,
        include_unstructured_data: request.include_unstructured_data,
    };
    Ok(serde_json::to_value(body)?)
}

pub(crate) fn fetch_body(request: &FetchRequest) -> Result<Value> {
    let body = FetchBody {
        ids: &request.ids,
        include_vectors: request.include_vectors,
        include_metadata: request.include_metadata,
        include_unstructured_data: request.include_unstructured_data,
    };
    Ok(serde_json::to_value(body)?)
}

pub(crate) fn delete_body(ids: Vec<String>) -> Result<Value> {
    Ok(serde_json::to_value(DeleteBody { ids })?)
}

/// Builds an update body.
///
/// # Errors
/// [`IndexError::Validation`] when the id is empty or nothing is updated.
pub(crate) fn update_body(request: &UpdateRequest) -> Result<Value> {
    if request.id.trim().is_empty() {
        return Err(IndexError::Validation("update requires an `id`".into()));
    }
    if request.vector.is_none() && request.data.is_none() && request.metadata.is_none() {
        return Err(IndexError::Validation(
            "update requires at least one of `vector`, `data`, `metadata`".into(),
        ));
    }
    let body = UpdateBody {
        id: &request.id,
        vector: request.vector.as_deref(),
        data: request.data.as_deref(),
        metadata: request.metadata.as_ref(),
        metadata_update_mode: request.metadata_update_mode,
    };
    Ok(serde_json::to_value(body)?)
}

pub(crate) fn resumable_next_body(handle: &str, additional_k: u32) -> Result<Value> {
    Ok(serde_json::to_value(ResumableNextBody {
        uuid: handle,
        additional_k,
    })?)
}

pub(crate) fn resumable_end_body(handle: &str) -> Result<Value> {
    Ok(serde_json::to_value(ResumableEndBody { uuid: handle })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_by_vector_selects_vector_path() {
        let request = QueryRequest::by_vector(vec![0.5, 0.25]);
        let (body, path) = query_body(&request).unwrap();
        assert_eq!(path, QUERY_PATH);
        assert_eq!(body["vector"], json!([0.5, 0.25]));
        assert_eq!(body["topK"], json!(10));
        assert_eq!(body["includeVectors"], json!(false));
        assert!(body.get("data").is_none());
        assert!(body.get("maxIdle").is_none());
    }

    #[test]
    fn query_by_data_selects_data_path() {
        let request = QueryRequest::by_data("hello");
        let (body, path) = query_body(&request).unwrap();
        assert_eq!(path, QUERY_DATA_PATH);
        assert_eq!(body["data"], json!("hello"));
        assert!(body.get("vector").is_none());
    }

    #[test]
    fn query_rejects_neither_and_both() {
        assert!(query_body(&QueryRequest::default()).is_err());

        let both = QueryRequest {
            vector: Some(vec![0.1]),
            data: Some("hello".into()),
            ..QueryRequest::default()
        };
        assert!(matches!(
            query_body(&both),
            Err(IndexError::Validation(_))
        ));
    }

    #[test]
    fn resumable_start_carries_max_idle() {
        let request = QueryRequest::by_vector(vec![0.1]);
        let (body, path) = resumable_start_body(&request, 3600).unwrap();
        assert_eq!(path, RESUMABLE_QUERY_PATH);
        assert_eq!(body["maxIdle"], json!(3600));

        let request = QueryRequest::by_data("hello");
        let (_, path) = resumable_start_body(&request, 60).unwrap();
        assert_eq!(path, RESUMABLE_QUERY_DATA_PATH);
    }

    #[test]
    fn singleton_batch_uses_single_path() {
        let plan = plan_query_batch(&[QueryRequest::by_vector(vec![0.1])]).unwrap();
        assert!(matches!(plan, BatchPlan::Single));
    }

    #[test]
    fn uniform_batch_builds_array_body() {
        let requests = vec![
            QueryRequest::by_vector(vec![0.1]),
            QueryRequest::by_vector(vec![0.2]),
        ];
        let BatchPlan::Many { body, base, namespace } = plan_query_batch(&requests).unwrap() else {
            panic!("expected a batch dispatch");
        };
        assert_eq!(base, QUERY_PATH);
        assert_eq!(namespace, "");
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn mixed_mode_batch_is_rejected() {
        let requests = vec![
            QueryRequest::by_vector(vec![0.1]),
            QueryRequest::by_data("hello"),
        ];
        assert!(matches!(
            plan_query_batch(&requests),
            Err(IndexError::Validation(_))
        ));
    }

    #[test]
    fn batch_namespaces_must_agree() {
        let mut second = QueryRequest::by_vector(vec![0.2]);
        second.namespace = "other".into();
        let requests = vec![QueryRequest::by_vector(vec![0.1]), second];
        assert!(plan_query_batch(&requests).is_err());
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(plan_query_batch(&[]).is_err());
    }

    #[test]
    fn range_rejects_zero_limit() {
        let request = RangeRequest {
            limit: 0,
            ..RangeRequest::default()
        };
        assert!(matches!(
            range_body(&request),
            Err(IndexError::Validation(_))
        ));
    }

    #[test]
    fn update_requires_a_change() {
        let request = UpdateRequest::new("id1");
        assert!(update_body(&request).is_err());

        let mut request = UpdateRequest::new("id1");
        request.metadata = Some(Metadata::new());
        request.metadata_update_mode = MetadataUpdateMode::Patch;
        let body = update_body(&request).unwrap();
        assert_eq!(body["metadataUpdateMode"], json!("PATCH"));
        assert!(body.get("vector").is_none());
    }
}
