//! Suspend-capable surface of the client.
//!
//! Mechanically parallel to [`crate::Index`]: the same pure core builds
//! every request, and each operation suspends only while the transport call
//! is in flight. No background work, retries, or locks held across awaits.

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
use crate::resumable::AsyncResumableQuery;
use crate::transport::{AsyncTransport, HttpTransport};
use crate::types::{
    DeleteResult, FetchRequest, InfoResult, QueryRequest, QueryResult, RangeRequest, RangeResult,
    UpdateRequest, UpdateResult, UpsertInput, VectorRecord,
};
use tracing::trace;

/// Non-blocking client for one index.
pub struct AsyncIndex<T = HttpTransport> {
    transport: T,
}

impl AsyncIndex {
    /// Creates a client from the given config.
    ///
    /// # Errors
    /// Returns [`IndexError::Config`] on invalid config and
    /// [`IndexError::Transport`] if the HTTP client cannot be built.
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(cfg)?,
        })
    }

    /// Creates a client from `VECTOR_INDEX_URL` / `VECTOR_INDEX_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }
}

impl<T: AsyncTransport> AsyncIndex<T> {
    /// Wraps an existing transport implementation.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Async form of [`crate::Index::upsert`], same contract.
    pub async fn upsert<I>(
        &self,
        vectors: impl IntoIterator<Item = I>,
        namespace: &str,
    ) -> Result<String>
    where
        I: Into<UpsertInput>,
    {
        let inputs: Vec<UpsertInput> = vectors.into_iter().map(Into::into).collect();
        let (records, mode) = normalize::normalize_batch(inputs)?;
        trace!("AsyncIndex::upsert records={} mode={mode:?}", records.len());

        let body = serde_json::to_value(&records)?;
        let base = match mode {
            BatchMode::Dense => UPSERT_PATH,
            BatchMode::Raw => UPSERT_DATA_PATH,
        };
        let result = self
            .transport
            .execute(&path_for(base, namespace), Some(body))
            .await?;
        decode::ack(result)
    }

    /// Async form of [`crate::Index::query`], same contract.
    pub async fn query(&self, request: &QueryRequest) -> Result<Vec<QueryResult>> {
        trace!("AsyncIndex::query top_k={}", request.top_k);
        let (body, base) = payload::query_body(request)?;
        let result = self
            .transport
            .execute(&path_for(base, &request.namespace), Some(body))
            .await?;
        decode::query_results(result)
    }

    /// Async form of [`crate::Index::query_many`], same contract.
    pub async fn query_many(&self, requests: &[QueryRequest]) -> Result<Vec<Vec<QueryResult>>> {
        trace!("AsyncIndex::query_many batch={}", requests.len());
        match payload::plan_query_batch(requests)? {
            BatchPlan::Single => Ok(vec![self.query(&requests[0]).await?]),
            BatchPlan::Many {
                body,
                base,
                namespace,
            } => {
                let result = self
                    .transport
                    .execute(&path_for(base, &namespace), Some(body))
                    .await?;
                decode::batch_query_results(result)
            }
        }
    }

    /// Opens a resumable query session in the `pending` state; call
    /// [`AsyncResumableQuery::start`] to obtain the first batch.
    pub fn resumable_query(
        &self,
        request: QueryRequest,
        max_idle_secs: Option<u64>,
    ) -> AsyncResumableQuery<'_, T> {
        AsyncResumableQuery::new(&self.transport, request, max_idle_secs)
    }

    /// Async form of [`crate::Index::fetch`], same contract.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Option<VectorRecord>>> {
        trace!("AsyncIndex::fetch ids={}", request.ids.len());
        let body = payload::fetch_body(request)?;
        let result = self
            .transport
            .execute(&path_for(FETCH_PATH, &request.namespace), Some(body))
            .await?;
        decode::fetch_results(result)
    }

    /// Async form of [`crate::Index::range`], same contract.
    pub async fn range(&self, request: &RangeRequest) -> Result<RangeResult> {
        trace!("AsyncIndex::range cursor={:?} limit={}", request.cursor, request.limit);
        let body = payload::range_body(request)?;
        let result = self
            .transport
            .execute(&path_for(RANGE_PATH, &request.namespace), Some(body))
            .await?;
        decode::from_value(result)
    }

    /// Async form of [`crate::Index::delete`], same contract.
    pub async fn delete<S>(
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
            .execute(&path_for(DELETE_PATH, namespace), Some(body))
            .await?;
        decode::from_value(result)
    }

    /// Async form of [`crate::Index::update`], same contract.
    pub async fn update(&self, request: &UpdateRequest) -> Result<UpdateResult> {
        trace!("AsyncIndex::update id={}", request.id);
        let body = payload::update_body(request)?;
        let result = self
            .transport
            .execute(&path_for(UPDATE_PATH, &request.namespace), Some(body))
            .await?;
        decode::from_value(result)
    }

    /// Async form of [`crate::Index::reset`], same contract.
    pub async fn reset(&self, namespace: &str) -> Result<String> {
        let result = self
            .transport
            .execute(&path_for(RESET_PATH, namespace), None)
            .await?;
        decode::ack(result)
    }

    /// Async form of [`crate::Index::reset_all`], same contract.
    pub async fn reset_all(&self) -> Result<String> {
        let result = self.transport.execute(RESET_ALL_PATH, None).await?;
        decode::ack(result)
    }

    /// Async form of [`crate::Index::info`], same contract.
    pub async fn info(&self) -> Result<InfoResult> {
        let result = self.transport.execute(INFO_PATH, None).await?;
        decode::from_value(result)
    }

    /// Async form of [`crate::Index::list_namespaces`], same contract.
    pub async fn list_namespaces(&self) -> Result<Vec<String>> {
        let result = self.transport.execute(LIST_NAMESPACES_PATH, None).await?;
        decode::from_value(result)
    }

    /// Async form of [`crate::Index::delete_namespace`], same contract.
    pub async fn delete_namespace(&self, namespace: &str) -> Result<String> {
        if namespace == DEFAULT_NAMESPACE {
            return Err(IndexError::Validation(
                "the default namespace cannot be deleted".into(),
            ));
        }
        let result = self
            .transport
            .execute(&path_for(DELETE_NAMESPACE_PATH, namespace), None)
            .await?;
        decode::ack(result)
    }
}
