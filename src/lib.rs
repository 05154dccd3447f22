//! REST client for a namespaced vector-similarity index service.
//!
//! This crate provides a clean API to:
//! - Upsert dense vectors or raw text embedded server-side
//! - Run similarity queries, singly or in batches
//! - Page through large result sets with resumable query sessions
//! - Scan, fetch, update, and delete records per namespace
//!
//! Two mechanically parallel surfaces share one pure request-building core,
//! so their behavior cannot drift:
//! - [`Index`] runs every operation to completion on the calling thread
//! - [`AsyncIndex`] suspends only while a transport call is in flight
//!
//! ```no_run
//! use vector_index_client::{ClientConfig, Index, QueryRequest};
//!
//! # fn main() -> vector_index_client::Result<()> {
//! let index = Index::new(&ClientConfig::new("https://index.example.com", "token"))?;
//!
//! index.upsert(
//!     vec![
//!         ("id1", vec![0.1, 0.2]),
//!         ("id2", vec![0.3, 0.4]),
//!     ],
//!     "",
//! )?;
//!
//! let hits = index.query(&QueryRequest::by_vector(vec![0.6, 0.9]))?;
//! println!("top hit: {:?}", hits.first());
//! # Ok(()) }
//! ```

mod async_index;
mod config;
mod decode;
mod errors;
mod index;
mod normalize;
mod paths;
mod payload;
mod resumable;
mod transport;
mod types;

#[cfg(test)]
mod test_support;

pub use async_index::AsyncIndex;
pub use config::{ClientConfig, ENV_TIMEOUT_SECS, ENV_TOKEN, ENV_URL};
pub use errors::{IndexError, Result};
pub use index::Index;
pub use paths::DEFAULT_NAMESPACE;
pub use resumable::{AsyncResumableQuery, DEFAULT_MAX_IDLE_SECS, ResumableQuery};
pub use transport::{AsyncTransport, BlockingTransport, HttpTransport, Transport};
pub use types::{
    DeleteResult, FetchRequest, InfoResult, Metadata, MetadataUpdateMode, NamespaceInfo,
    QueryRequest, QueryResult, RangeRequest, RangeResult, UpdateRequest, UpdateResult,
    UpsertInput, VectorRecord,
};
