//! Resumable query sessions: paging through a large similarity-search
//! result set via a server-held cursor.
//!
//! The lifecycle is an explicit state machine, `pending → active → stopped`;
//! the opaque server handle exists only in the `active` state, so "use
//! before start" and "use after stop" are rejected without a request.
//! Sessions are single-owner and sequential; an abandoned session expires
//! server-side once its idle timeout elapses.

use crate::decode;
use crate::errors::{IndexError, Result};
use crate::paths::{RESUMABLE_QUERY_END_PATH, RESUMABLE_QUERY_NEXT_PATH, path_for};
use crate::payload;
use crate::transport::{AsyncTransport, Transport};
use crate::types::{QueryRequest, QueryResult};
use tracing::{debug, trace};

/// Advisory idle timeout sent to the server when none is given.
pub const DEFAULT_MAX_IDLE_SECS: u64 = 3600;

enum SessionState {
    Pending {
        request: QueryRequest,
        max_idle_secs: u64,
    },
    Active {
        handle: String,
    },
    Stopped,
}

impl SessionState {
    fn pending(request: QueryRequest, max_idle_secs: Option<u64>) -> Self {
        Self::Pending {
            request,
            max_idle_secs: max_idle_secs.unwrap_or(DEFAULT_MAX_IDLE_SECS),
        }
    }
}

/// Maps a remote rejection of a continue call onto the dedicated expiry
/// error when the server no longer recognizes the handle. The service
/// reports both idle expiry and unknown handles through the same
/// application-level error channel, so the match is on the message.
fn classify_fetch_error(err: IndexError) -> IndexError {
    match err {
        IndexError::Remote { message, status } => {
            let lowered = message.to_ascii_lowercase();
            if lowered.contains("expired") || lowered.contains("not found") {
                IndexError::SessionExpired(message)
            } else {
                IndexError::Remote { status, message }
            }
        }
        other => other,
    }
}

fn invalid_state(state: &SessionState) -> IndexError {
    match state {
        SessionState::Pending { .. } => {
            IndexError::InvalidState("resumable query has not been started")
        }
        SessionState::Active { .. } => {
            IndexError::InvalidState("resumable query is already active")
        }
        SessionState::Stopped => IndexError::InvalidState("resumable query was stopped"),
    }
}

/* ==========================
Blocking session
========================== */

/// Blocking resumable query session handle.
///
/// Obtained from [`crate::Index::resumable_query`]; borrows the index's
/// transport for its whole lifetime.
pub struct ResumableQuery<'a, T> {
    transport: &'a T,
    namespace: String,
    state: SessionState,
}

impl<'a, T: Transport> ResumableQuery<'a, T> {
    pub(crate) fn new(transport: &'a T, request: QueryRequest, max_idle_secs: Option<u64>) -> Self {
        let namespace = request.namespace.clone();
        Self {
            transport,
            namespace,
            state: SessionState::pending(request, max_idle_secs),
        }
    }

    /// True while the server holds a live handle for this session.
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    /// Starts the session and returns the first batch of results.
    ///
    /// On failure the session stays `pending` and may be started again.
    ///
    /// # Errors
    /// [`IndexError::Validation`] for a malformed query,
    /// [`IndexError::InvalidState`] if already started,
    /// [`IndexError::Remote`] when the server rejects the query.
    pub fn start(&mut self) -> Result<Vec<QueryResult>> {
        let SessionState::Pending {
            request,
            max_idle_secs,
        } = &self.state
        else {
            return Err(invalid_state(&self.state));
        };

        let (body, base) = payload::resumable_start_body(request, *max_idle_secs)?;
        let result = self
            .transport
            .execute(&path_for(base, &self.namespace), Some(body))?;
        let (handle, first) = decode::resumable_start(result)?;

        debug!("resumable query started, first_batch={}", first.len());
        self.state = SessionState::Active { handle };
        Ok(first)
    }

    /// Fetches up to `additional_k` more results.
    ///
    /// A batch shorter than `additional_k` (possibly empty) means the scan
    /// is exhausted; that is not an error.
    ///
    /// # Errors
    /// [`IndexError::InvalidState`] unless the session is active;
    /// [`IndexError::SessionExpired`] when the server no longer knows the
    /// handle, in which case the session transitions to `stopped`.
    pub fn fetch_next(&mut self, additional_k: u32) -> Result<Vec<QueryResult>> {
        let SessionState::Active { handle } = &self.state else {
            return Err(invalid_state(&self.state));
        };
        trace!("resumable fetch_next additional_k={additional_k}");

        let body = payload::resumable_next_body(handle, additional_k)?;
        match self.transport.execute(RESUMABLE_QUERY_NEXT_PATH, Some(body)) {
            Ok(result) => decode::query_results(result),
            Err(err) => {
                let err = classify_fetch_error(err);
                if matches!(err, IndexError::SessionExpired(_)) {
                    self.state = SessionState::Stopped;
                }
                Err(err)
            }
        }
    }

    /// Releases the server-side session.
    ///
    /// Best-effort: the session transitions to `stopped` even when the
    /// remote call fails, leaving cleanup to the server's idle timeout.
    /// Calling `stop` again is a no-op success.
    pub fn stop(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, SessionState::Stopped) {
            SessionState::Active { handle } => {
                let body = payload::resumable_end_body(&handle)?;
                if let Err(err) = self.transport.execute(RESUMABLE_QUERY_END_PATH, Some(body)) {
                    debug!("resumable query stop failed, handle released locally: {err}");
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/* ==========================
Async session
========================== */

/// Suspend-capable twin of [`ResumableQuery`], obtained from
/// [`crate::AsyncIndex::resumable_query`].
pub struct AsyncResumableQuery<'a, T> {
    transport: &'a T,
    namespace: String,
    state: SessionState,
}

impl<'a, T: AsyncTransport> AsyncResumableQuery<'a, T> {
    pub(crate) fn new(transport: &'a T, request: QueryRequest, max_idle_secs: Option<u64>) -> Self {
        let namespace = request.namespace.clone();
        Self {
            transport,
            namespace,
            state: SessionState::pending(request, max_idle_secs),
        }
    }

    /// True while the server holds a live handle for this session.
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    /// Async form of [`ResumableQuery::start`], same contract.
    pub async fn start(&mut self) -> Result<Vec<QueryResult>> {
        let SessionState::Pending {
            request,
            max_idle_secs,
        } = &self.state
        else {
            return Err(invalid_state(&self.state));
        };

        let (body, base) = payload::resumable_start_body(request, *max_idle_secs)?;
        let result = self
            .transport
            .execute(&path_for(base, &self.namespace), Some(body))
            .await?;
        let (handle, first) = decode::resumable_start(result)?;

        debug!("resumable query started, first_batch={}", first.len());
        self.state = SessionState::Active { handle };
        Ok(first)
    }

    /// Async form of [`ResumableQuery::fetch_next`], same contract.
    pub async fn fetch_next(&mut self, additional_k: u32) -> Result<Vec<QueryResult>> {
        let SessionState::Active { handle } = &self.state else {
            return Err(invalid_state(&self.state));
        };
        trace!("resumable fetch_next additional_k={additional_k}");

        let body = payload::resumable_next_body(handle, additional_k)?;
        match self
            .transport
            .execute(RESUMABLE_QUERY_NEXT_PATH, Some(body))
            .await
        {
            Ok(result) => decode::query_results(result),
            Err(err) => {
                let err = classify_fetch_error(err);
                if matches!(err, IndexError::SessionExpired(_)) {
                    self.state = SessionState::Stopped;
                }
                Err(err)
            }
        }
    }

    /// Async form of [`ResumableQuery::stop`], same contract.
    pub async fn stop(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, SessionState::Stopped) {
            SessionState::Active { handle } => {
                let body = payload::resumable_end_body(&handle)?;
                if let Err(err) = self
                    .transport
                    .execute(RESUMABLE_QUERY_END_PATH, Some(body))
                    .await
                {
                    debug!("resumable query stop failed, handle released locally: {err}");
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubTransport;
    use serde_json::json;

    fn start_response() -> serde_json::Value {
        json!({
            "uuid": "handle-1",
            "scores": [{"id": "a", "score": 0.9}],
        })
    }

    #[test]
    fn start_transitions_pending_to_active() {
        let stub = StubTransport::returning(vec![Ok(start_response())]);
        let mut session = ResumableQuery::new(&stub, QueryRequest::by_vector(vec![0.1]), None);
        assert!(!session.is_active());

        let first = session.start().unwrap();
        assert!(session.is_active());
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "a");

        let calls = stub.calls();
        assert_eq!(calls[0].0, "resumable-query");
        assert_eq!(calls[0].1.as_ref().unwrap()["maxIdle"], json!(3600));
    }

    #[test]
    fn start_in_a_namespace_suffixes_the_path() {
        let stub = StubTransport::returning(vec![Ok(start_response())]);
        let mut request = QueryRequest::by_data("hello");
        request.namespace = "ns1".into();
        let mut session = ResumableQuery::new(&stub, request, Some(120));

        session.start().unwrap();
        let calls = stub.calls();
        assert_eq!(calls[0].0, "resumable-query-data/ns1");
        assert_eq!(calls[0].1.as_ref().unwrap()["maxIdle"], json!(120));
    }

    #[test]
    fn failed_start_leaves_the_session_pending() {
        let stub = StubTransport::returning(vec![
            Err(IndexError::Remote {
                status: 422,
                message: "dimension mismatch".into(),
            }),
            Ok(start_response()),
        ]);
        let mut session = ResumableQuery::new(&stub, QueryRequest::by_vector(vec![0.1]), None);

        assert!(matches!(
            session.start(),
            Err(IndexError::Remote { status: 422, .. })
        ));
        assert!(!session.is_active());

        // Still pending, so a retry is allowed.
        session.start().unwrap();
        assert!(session.is_active());
    }

    #[test]
    fn fetch_next_requires_an_active_session() {
        let stub = StubTransport::returning(vec![]);
        let mut session = ResumableQuery::new(&stub, QueryRequest::by_vector(vec![0.1]), None);

        assert!(matches!(
            session.fetch_next(5),
            Err(IndexError::InvalidState(_))
        ));
        assert_eq!(stub.call_count(), 0);
    }

    #[test]
    fn fetch_next_returns_following_batches() {
        let stub = StubTransport::returning(vec![
            Ok(start_response()),
            Ok(json!([{"id": "b", "score": 0.8}, {"id": "c", "score": 0.7}])),
            Ok(json!([])),
        ]);
        let mut session = ResumableQuery::new(&stub, QueryRequest::by_vector(vec![0.1]), None);
        session.start().unwrap();

        let batch = session.fetch_next(2).unwrap();
        assert_eq!(batch.len(), 2);

        // An empty batch signals exhaustion, not an error.
        let exhausted = session.fetch_next(2).unwrap();
        assert!(exhausted.is_empty());
        assert!(session.is_active());

        let calls = stub.calls();
        assert_eq!(calls[1].0, "resumable-query-next");
        assert_eq!(
            calls[1].1.as_ref().unwrap(),
            &json!({"uuid": "handle-1", "additionalK": 2})
        );
    }

    #[test]
    fn expiry_stops_the_session_with_a_dedicated_error() {
        let stub = StubTransport::returning(vec![
            Ok(start_response()),
            Err(IndexError::Remote {
                status: 400,
                message: "resumable query handle not found or expired".into(),
            }),
        ]);
        let mut session = ResumableQuery::new(&stub, QueryRequest::by_vector(vec![0.1]), None);
        session.start().unwrap();

        assert!(matches!(
            session.fetch_next(5),
            Err(IndexError::SessionExpired(_))
        ));
        assert!(!session.is_active());

        // The stopped session refuses further fetches without contacting
        // the transport again.
        let calls_before = stub.call_count();
        assert!(matches!(
            session.fetch_next(5),
            Err(IndexError::InvalidState(_))
        ));
        assert_eq!(stub.call_count(), calls_before);
    }

    #[test]
    fn other_remote_errors_do_not_stop_the_session() {
        let stub = StubTransport::returning(vec![
            Ok(start_response()),
            Err(IndexError::Remote {
                status: 503,
                message: "temporarily unavailable".into(),
            }),
        ]);
        let mut session = ResumableQuery::new(&stub, QueryRequest::by_vector(vec![0.1]), None);
        session.start().unwrap();

        assert!(matches!(
            session.fetch_next(5),
            Err(IndexError::Remote { status: 503, .. })
        ));
        assert!(session.is_active());
    }

    #[test]
    fn stop_is_idempotent() {
        let stub = StubTransport::returning(vec![Ok(start_response()), Ok(json!("Success"))]);
        let mut session = ResumableQuery::new(&stub, QueryRequest::by_vector(vec![0.1]), None);
        session.start().unwrap();

        session.stop().unwrap();
        assert!(!session.is_active());
        assert_eq!(stub.call_count(), 2);

        // Second stop performs no transport side effect.
        session.stop().unwrap();
        assert_eq!(stub.call_count(), 2);
    }

    #[test]
    fn stop_swallows_remote_failures() {
        let stub = StubTransport::returning(vec![
            Ok(start_response()),
            Err(IndexError::Remote {
                status: 500,
                message: "internal".into(),
            }),
        ]);
        let mut session = ResumableQuery::new(&stub, QueryRequest::by_vector(vec![0.1]), None);
        session.start().unwrap();

        session.stop().unwrap();
        assert!(!session.is_active());
    }

    #[test]
    fn stop_before_start_releases_nothing() {
        let stub = StubTransport::returning(vec![]);
        let mut session = ResumableQuery::new(&stub, QueryRequest::by_vector(vec![0.1]), None);

        session.stop().unwrap();
        assert_eq!(stub.call_count(), 0);

        // Stopped now, so starting is no longer possible.
        assert!(matches!(session.start(), Err(IndexError::InvalidState(_))));
    }
}
