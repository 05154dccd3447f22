//! HTTP transport for the index service.
//!
//! Owns the reqwest clients, bearer authentication, timeout, and the
//! response envelope decode. Operations never touch reqwest directly; they
//! go through the [`Transport`] / [`AsyncTransport`] seams, which also lets
//! tests substitute a call-recording stub.
//!
//! Every request is `POST {url}/{path}` with an optional JSON body. The
//! service wraps responses in an envelope: `{"result": ...}` on success,
//! `{"error": "...", "status": ...}` on rejection.

use crate::config::ClientConfig;
use crate::errors::{IndexError, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Blocking transport seam.
pub trait Transport {
    /// Executes `POST {url}/{path}` and returns the decoded `result`
    /// payload.
    ///
    /// # Errors
    /// [`IndexError::Remote`] for application-level rejections,
    /// [`IndexError::Transport`] / [`IndexError::Decode`] for HTTP and
    /// envelope failures.
    fn execute(&self, path: &str, payload: Option<Value>) -> Result<Value>;
}

/// Suspend-capable transport seam, mirroring [`Transport`].
pub trait AsyncTransport {
    /// Async form of [`Transport::execute`], with the same error contract.
    fn execute(
        &self,
        path: &str,
        payload: Option<Value>,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/* ==========================
Reqwest-backed transports
========================== */

/// Blocking transport over `reqwest::blocking`.
pub struct BlockingTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl BlockingTransport {
    /// Builds the transport from a validated config.
    ///
    /// # Errors
    /// [`IndexError::Config`] on invalid config, [`IndexError::Transport`]
    /// if the HTTP client cannot be built.
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        cfg.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout(cfg))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url(cfg),
            token: cfg.token.clone(),
        })
    }
}

impl Transport for BlockingTransport {
    fn execute(&self, path: &str, payload: Option<Value>) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {url}");
        let mut request = self.client.post(&url).bearer_auth(&self.token);
        if let Some(body) = &payload {
            request = request.json(body);
        }
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        decode_envelope(status, &body)
    }
}

/// Async transport over `reqwest::Client`.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Async twin of [`BlockingTransport::new`].
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        cfg.validate()?;
        let client = reqwest::Client::builder().timeout(timeout(cfg)).build()?;
        Ok(Self {
            client,
            base_url: base_url(cfg),
            token: cfg.token.clone(),
        })
    }
}

impl AsyncTransport for HttpTransport {
    async fn execute(&self, path: &str, payload: Option<Value>) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {url}");
        let mut request = self.client.post(&url).bearer_auth(&self.token);
        if let Some(body) = &payload {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }
}

fn timeout(cfg: &ClientConfig) -> Duration {
    Duration::from_secs(cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
}

fn base_url(cfg: &ClientConfig) -> String {
    cfg.url.trim_end_matches('/').to_string()
}

/* ==========================
Response envelope
========================== */

#[derive(Deserialize)]
struct Envelope {
    result: Option<Value>,
    error: Option<String>,
    status: Option<u16>,
}

/// Decodes the service response envelope into the `result` payload.
fn decode_envelope(status: StatusCode, body: &str) -> Result<Value> {
    if status.is_success() {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| IndexError::Decode(format!("bad response envelope: {e}")))?;
        if let Some(message) = envelope.error {
            return Err(IndexError::Remote {
                status: envelope.status.unwrap_or_else(|| status.as_u16()),
                message,
            });
        }
        return Ok(envelope.result.unwrap_or(Value::Null));
    }

    if let Ok(Envelope {
        error: Some(message),
        status: reported,
        ..
    }) = serde_json::from_str::<Envelope>(body)
    {
        return Err(IndexError::Remote {
            status: reported.unwrap_or_else(|| status.as_u16()),
            message,
        });
    }

    // Not our envelope; keep a short snippet of whatever came back.
    let snippet: String = body.chars().take(240).collect();
    Err(IndexError::Remote {
        status: status.as_u16(),
        message: snippet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_yields_result() {
        let value = decode_envelope(StatusCode::OK, r#"{"result": "Success"}"#).unwrap();
        assert_eq!(value, json!("Success"));
    }

    #[test]
    fn error_envelope_maps_to_remote() {
        let err = decode_envelope(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error": "dimension mismatch", "status": 422}"#,
        )
        .unwrap_err();
        match err {
            IndexError::Remote { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "dimension mismatch");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn error_in_success_status_still_maps_to_remote() {
        let err = decode_envelope(StatusCode::OK, r#"{"error": "unknown namespace"}"#).unwrap_err();
        assert!(matches!(err, IndexError::Remote { status: 200, .. }));
    }

    #[test]
    fn non_envelope_error_body_falls_back_to_snippet() {
        let err = decode_envelope(StatusCode::BAD_GATEWAY, "<html>boom</html>").unwrap_err();
        match err {
            IndexError::Remote { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_success_body_is_a_decode_error() {
        assert!(matches!(
            decode_envelope(StatusCode::OK, "not json"),
            Err(IndexError::Decode(_))
        ));
    }
}
