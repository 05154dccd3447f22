//! Call-recording transport stubs shared by the unit tests.

use crate::errors::Result;
use crate::transport::{AsyncTransport, Transport};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted transport: replays canned responses in order and records every
/// call so tests can assert paths, payloads, and call counts.
pub(crate) struct StubTransport {
    calls: Mutex<Vec<(String, Option<Value>)>>,
    responses: Mutex<VecDeque<Result<Value>>>,
}

impl StubTransport {
    pub(crate) fn returning(responses: Vec<Result<Value>>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls(&self) -> Vec<(String, Option<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, path: &str, payload: Option<Value>) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), payload));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected transport call to `{path}`"))
    }
}

impl Transport for StubTransport {
    fn execute(&self, path: &str, payload: Option<Value>) -> Result<Value> {
        self.next(path, payload)
    }
}

impl AsyncTransport for StubTransport {
    async fn execute(&self, path: &str, payload: Option<Value>) -> Result<Value> {
        self.next(path, payload)
    }
}
