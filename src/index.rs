//! Blocking surface of the client.
//!
//! Every operation validates and builds its request body through the pure
//! core (`normalize`, `payload`, `paths`), then runs exactly one transport
//! call on the calling thread. [`crate::AsyncIndex`] is the mechanically
//! parallel suspend-capable twin.

use crate::config::ClientConfig;
use crate::decode;
use crate::errors::{IndexError, Result};
use crate::normalize::{self, BatchMode};
use crate::paths::{
    DEFAULT_NAMESPACE, DELETE_NAMESPACE_PATH, DELETE_PATH, FETCH_PATH, INFO_PATH,
    LIST_NAMESPACES_PATH, RANGE_PATH, RESET_ALL_PATH, RESET_PATH, UPDATE_PATH, UPSERT_DATA_PATH,
    UPSERT_PATH, path_for,
};
use crate::payload::{self, BatchPlan};
use crate::resumable::ResumableQuery;
use crate::transport::{BlockingTransport, Transport};
use crate::types::{
    DeleteResult, FetchRequest, InfoResult, QueryRequest, QueryResult, RangeRequest, RangeResult,
    UpdateRequest, UpdateResult, UpsertInput, VectorRecord,
};
use tracing::trace;

/// Blocking client for one index.
pub struct Index<T = BlockingTransport> {
    transport: T,
}

impl Index {
    /// Creates a client from the given config.
    ///
    /// # Errors
    /// Returns [`IndexError::Config`] on invalid config and
    /// [`IndexError::Transport`] if the HTTP client cannot be built.
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: BlockingTransport::new(cfg)?,
        })
    }

    /// Creates a client from `VECTOR_INDEX_URL` / `VECTOR_INDEX_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }
}

impl<T: Transport> Index<T> {
    /// Wraps an existing transport implementation.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Upserts a batch of records into `namespace`.
    ///
    /// Accepts positional tuples, keyed JSON mappings, and canonical
    /// [`VectorRecord`]s; the whole batch must be uniformly dense or
    /// uniformly raw-data.
    ///
    /// # Errors
    /// [`IndexError::Validation`] on malformed records or a mixed-mode
    /// batch; nothing is sent in that case.
    pub fn upsert<I>(&self, vectors: impl IntoIterator<Item = I>, namespace: &str) -> Result<String>
    where
        I: Into<UpsertInput>,
    {
        let inputs: Vec<UpsertInput> = vectors.into_iter().map(Into::into).collect();
        let (records, mode) = normalize::normalize_batch(inputs)?;
        trace!("Index::upsert records={} mode={mode:?}", records.len());

        let body = serde_json::to_value(&records)?;
        let base = match mode {
            BatchMode::Dense => UPSERT_PATH,
            BatchMode::Raw => UPSERT_DATA_PATH,
        };
        let result = self.transport.execute(&path_for(base, namespace), Some(body))?;
        decode::ack(result)
    }

    /// Queries the `top_k` most similar vectors.
    pub fn query(&self, request: &QueryRequest) -> Result<Vec<QueryResult>> {
        trace!("Index::query top_k={}", request.top_k);
        let (body, base) = payload::query_body(request)?;
        let result = self
            .transport
            .execute(&path_for(base, &request.namespace), Some(body))?;
        decode::query_results(result)
    }

    /// Runs a batch of queries sharing one namespace; results are
    /// positionally aligned with the requests.
    pub fn query_many(&self, requests: &[QueryRequest]) -> Result<Vec<Vec<QueryResult>>> {
        trace!("Index::query_many batch={}", requests.len());
        match payload::plan_query_batch(requests)? {
            BatchPlan::Single => Ok(vec![self.query(&requests[0])?]),
            BatchPlan::Many {
                body,
                base,
                namespace,
            } => {
                let result = self.transport.execute(&path_for(base, &namespace), Some(body))?;
                decode::batch_query_results(result)
            }
        }
    }

    /// Opens a resumable query session in the `pending` state; call
    /// [`ResumableQuery::start`] to obtain the first batch.
    ///
    /// `max_idle_secs` is advisory to the server: how long the session may
    /// sit idle between calls before it expires (default 3600).
    pub fn resumable_query(
        &self,
        request: QueryRequest,
        max_idle_secs: Option<u64>,
    ) -> ResumableQuery<'_, T> {
        ResumableQuery::new(&self.transport, request, max_idle_secs)
    }

    /// Fetches records by id; unknown ids yield `None` at their position.
    pub fn fetch(&self, request: &FetchRequest) -> Result<Vec<Option<VectorRecord>>> {
        trace!("Index::fetch ids={}", request.ids.len());
        let body = payload::fetch_body(request)?;
        let result = self
            .transport
            .execute(&path_for(FETCH_PATH, &request.namespace), Some(body))?;
        decode::fetch_results(result)
    }

    /// Scans one page of records starting at `request.cursor`; an empty
    /// `next_cursor` in the result signals exhaustion.
    pub fn range(&self, request: &RangeRequest) -> Result<RangeResult> {
        trace!("Index::range cursor={:?} limit={}", request.cursor, request.limit);
        let body = payload::range_body(request)?;
        let result = self
            .transport
            .execute(&path_for(RANGE_PATH, &request.namespace), Some(body))?;
        decode::from_value(result)
    }

    /// Deletes the given ids from `namespace`.
    pub fn delete<S>(
        &self,
        ids: impl IntoIterator<Item = S>,
        namespace: &str,
    ) -> Result<DeleteResult>
    where
        S: Into<String>,
    {
        let body = payload::delete_body(ids.into_iter().map(Into::into).collect())?;
        let result = self
            .transport
            .execute(&path_for(DELETE_PATH, namespace), Some(body))?;
        decode::from_value(result)
    }

    /// Applies a partial update to one record.
    pub fn update(&self, request: &UpdateRequest) -> Result<UpdateResult> {
        trace!("Index::update id={}", request.id);
        let body = payload::update_body(request)?;
        let result = self
            .transport
            .execute(&path_for(UPDATE_PATH, &request.namespace), Some(body))?;
        decode::from_value(result)
    }

    /// Removes every vector in `namespace`.
    pub fn reset(&self, namespace: &str) -> Result<String> {
        let result = self
            .transport
            .execute(&path_for(RESET_PATH, namespace), None)?;
        decode::ack(result)
    }

    /// Removes every vector in every namespace.
    pub fn reset_all(&self) -> Result<String> {
        let result = self.transport.execute(RESET_ALL_PATH, None)?;
        decode::ack(result)
    }

    /// Returns index-wide statistics, including per-namespace counters.
    pub fn info(&self) -> Result<InfoResult> {
        let result = self.transport.execute(INFO_PATH, None)?;
        decode::from_value(result)
    }

    /// Lists the namespaces of the index.
    pub fn list_namespaces(&self) -> Result<Vec<String>> {
        let result = self.transport.execute(LIST_NAMESPACES_PATH, None)?;
        decode::from_value(result)
    }

    /// Deletes a namespace and everything in it.
    ///
    /// # Errors
    /// [`IndexError::Validation`] for the default namespace, which cannot
    /// be deleted; no request is sent in that case.
    pub fn delete_namespace(&self, namespace: &str) -> Result<String> {
        if namespace == DEFAULT_NAMESPACE {
            return Err(IndexError::Validation(
                "the default namespace cannot be deleted".into(),
            ));
        }
        let result = self
            .transport
            .execute(&path_for(DELETE_NAMESPACE_PATH, namespace), None)?;
        decode::ack(result)
    }
}
