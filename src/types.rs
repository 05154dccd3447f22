//! Core data models: canonical records, request specifications, and typed
//! results decoded from the service.
//!
//! Wire names are camelCase (`topK`, `includeVectors`, `unstructuredData`);
//! the Rust side stays snake_case via serde renames.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// String-keyed metadata attached to a record.
pub type Metadata = BTreeMap<String, Value>;

/* ==========================
Canonical record
========================== */

/// Canonical upsert unit.
///
/// Exactly one of `vector` (dense mode) and `data` (raw text embedded
/// server-side) must be set; `unstructured_data` is an opaque payload stored
/// verbatim and returned with fetch/query results when requested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unstructured_data: Option<String>,
}

impl VectorRecord {
    /// Creates a dense record from an id and vector values.
    pub fn dense(id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector: Some(vector),
            data: None,
            metadata: None,
            unstructured_data: None,
        }
    }

    /// Creates a raw-data record whose vector is computed server-side.
    pub fn raw(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vector: None,
            data: Some(data.into()),
            metadata: None,
            unstructured_data: None,
        }
    }

    /// Attaches metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attaches an opaque payload stored alongside the vector.
    pub fn with_unstructured_data(mut self, data: impl Into<String>) -> Self {
        self.unstructured_data = Some(data.into());
        self
    }
}

/* ==========================
Polymorphic upsert input
========================== */

/// One upsert candidate in any of the accepted shapes.
///
/// All shapes converge on [`VectorRecord`] during normalization; conversion
/// failures surface as [`crate::IndexError::Validation`] before any request
/// is sent.
#[derive(Clone, Debug)]
pub enum UpsertInput {
    /// Already-canonical record.
    Record(VectorRecord),
    /// Keyed JSON mapping with the canonical field names
    /// (`id`, `vector`, `data`, `metadata`, `unstructuredData`).
    Fields(Value),
    /// Positional dense shape: id, values, optional metadata, optional
    /// unstructured payload.
    Dense {
        id: String,
        vector: Vec<f32>,
        metadata: Option<Metadata>,
        unstructured_data: Option<String>,
    },
    /// Positional raw-data shape: id, text to embed, optional metadata.
    Raw {
        id: String,
        data: String,
        metadata: Option<Metadata>,
    },
}

impl From<VectorRecord> for UpsertInput {
    fn from(record: VectorRecord) -> Self {
        Self::Record(record)
    }
}

impl From<Value> for UpsertInput {
    fn from(fields: Value) -> Self {
        Self::Fields(fields)
    }
}

impl<S: Into<String>> From<(S, Vec<f32>)> for UpsertInput {
    fn from((id, vector): (S, Vec<f32>)) -> Self {
        Self::Dense {
            id: id.into(),
            vector,
            metadata: None,
            unstructured_data: None,
        }
    }
}

impl<S: Into<String>> From<(S, &[f32])> for UpsertInput {
    fn from((id, vector): (S, &[f32])) -> Self {
        Self::Dense {
            id: id.into(),
            vector: vector.to_vec(),
            metadata: None,
            unstructured_data: None,
        }
    }
}

impl<S: Into<String>> From<(S, Vec<f32>, Metadata)> for UpsertInput {
    fn from((id, vector, metadata): (S, Vec<f32>, Metadata)) -> Self {
        Self::Dense {
            id: id.into(),
            vector,
            metadata: Some(metadata),
            unstructured_data: None,
        }
    }
}

impl<S: Into<String>, U: Into<String>> From<(S, Vec<f32>, Metadata, U)> for UpsertInput {
    fn from((id, vector, metadata, unstructured): (S, Vec<f32>, Metadata, U)) -> Self {
        Self::Dense {
            id: id.into(),
            vector,
            metadata: Some(metadata),
            unstructured_data: Some(unstructured.into()),
        }
    }
}

impl<S: Into<String>> From<(S, &str)> for UpsertInput {
    fn from((id, data): (S, &str)) -> Self {
        Self::Raw {
            id: id.into(),
            data: data.to_string(),
            metadata: None,
        }
    }
}

impl<S: Into<String>> From<(S, &str, Metadata)> for UpsertInput {
    fn from((id, data, metadata): (S, &str, Metadata)) -> Self {
        Self::Raw {
            id: id.into(),
            data: data.to_string(),
            metadata: Some(metadata),
        }
    }
}

/* ==========================
Request specifications
========================== */

/// One similarity-search specification.
///
/// Exactly one of `vector` and `data` must be set; building the request
/// fails otherwise. `top_k` is forwarded as given, the server enforces its
/// own range limits.
#[derive(Clone, Debug)]
pub struct QueryRequest {
    pub vector: Option<Vec<f32>>,
    pub data: Option<String>,
    pub top_k: u32,
    pub include_vectors: bool,
    pub include_metadata: bool,
    pub include_unstructured_data: bool,
    /// Filter expression; empty string means no filter.
    pub filter: String,
    /// Target namespace; empty string means the default namespace.
    pub namespace: String,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            vector: None,
            data: None,
            top_k: 10,
            include_vectors: false,
            include_metadata: false,
            include_unstructured_data: false,
            filter: String::new(),
            namespace: String::new(),
        }
    }
}

impl QueryRequest {
    /// Query by dense vector values.
    pub fn by_vector(vector: Vec<f32>) -> Self {
        Self {
            vector: Some(vector),
            ..Self::default()
        }
    }

    /// Query by raw text embedded server-side.
    pub fn by_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }
}

/// Paginated scan specification.
#[derive(Clone, Debug)]
pub struct RangeRequest {
    /// Opaque scan position; empty string starts from the beginning.
    pub cursor: String,
    /// Maximum records per page; must be greater than zero.
    pub limit: u32,
    pub include_vectors: bool,
    pub include_metadata: bool,
    pub include_unstructured_data: bool,
    pub namespace: String,
}

impl Default for RangeRequest {
    fn default() -> Self {
        Self {
            cursor: String::new(),
            limit: 100,
            include_vectors: false,
            include_metadata: false,
            include_unstructured_data: false,
            namespace: String::new(),
        }
    }
}

/// Fetch-by-id specification.
#[derive(Clone, Debug, Default)]
pub struct FetchRequest {
    pub ids: Vec<String>,
    pub include_vectors: bool,
    pub include_metadata: bool,
    pub include_unstructured_data: bool,
    pub namespace: String,
}

impl FetchRequest {
    /// Creates a fetch request for the given ids.
    pub fn new<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// How `update` applies the supplied metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetadataUpdateMode {
    /// Replace the whole metadata object.
    #[default]
    Overwrite,
    /// RFC 7396 merge-patch into the existing metadata, performed
    /// server-side.
    Patch,
}

/// Partial update of one record.
///
/// At least one of `vector`, `data`, `metadata` must be set.
#[derive(Clone, Debug)]
pub struct UpdateRequest {
    pub id: String,
    pub vector: Option<Vec<f32>>,
    pub data: Option<String>,
    pub metadata: Option<Metadata>,
    pub metadata_update_mode: MetadataUpdateMode,
    pub namespace: String,
}

impl UpdateRequest {
    /// Creates an empty update for the given id; set the fields to change.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vector: None,
            data: None,
            metadata: None,
            metadata_update_mode: MetadataUpdateMode::default(),
            namespace: String::new(),
        }
    }
}

/* ==========================
Typed results
========================== */

/// One similarity-search hit.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub id: String,
    pub score: f32,
    pub vector: Option<Vec<f32>>,
    pub metadata: Option<Metadata>,
    pub unstructured_data: Option<String>,
}

/// One page of a range scan. An empty `next_cursor` signals exhaustion.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeResult {
    #[serde(default)]
    pub next_cursor: String,
    #[serde(default)]
    pub vectors: Vec<VectorRecord>,
}

/// Acknowledgement of a delete, with the number of vectors removed.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct DeleteResult {
    pub deleted: u64,
}

/// Acknowledgement of an update.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct UpdateResult {
    pub updated: u64,
}

/// Per-namespace counters reported by [`InfoResult`].
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInfo {
    pub vector_count: u64,
    pub pending_vector_count: u64,
}

/// Index-wide statistics.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResult {
    pub vector_count: u64,
    pub pending_vector_count: u64,
    /// Total size of the index on disk, in bytes.
    pub index_size: u64,
    pub dimension: u32,
    pub similarity_function: String,
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceInfo>,
}
