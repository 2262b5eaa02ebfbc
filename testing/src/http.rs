//! Scripted request capability
//!
//! [`MockHttpClient`] answers requests from per-route response queues and
//! records every call. Responses for a route are consumed in order; the last
//! one stays in place and answers every further call. Unscripted routes
//! answer with a 404 status error.
//!
//! A gated mock holds every request until the test releases it, which makes
//! interleavings of concurrent requests deterministic.

use roster_core::{HttpClient, RequestError};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;

/// HTTP method of a recorded call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

/// One request received by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Request method
    pub method: Method,
    /// Requested URL
    pub url: String,
    /// JSON body (`POST`/`PUT` only)
    pub body: Option<Value>,
}

type Response = Result<Value, RequestError>;

#[derive(Default)]
struct Script {
    routes: HashMap<(Method, String), VecDeque<Response>>,
    calls: Vec<RecordedCall>,
    echo_writes: bool,
}

impl Script {
    fn next_response(&mut self, method: Method, url: &str, body: Option<&Value>) -> Response {
        if let Some(queue) = self.routes.get_mut(&(method, url.to_string())) {
            let response = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            if let Some(response) = response {
                return response;
            }
        }

        match (method, body) {
            (Method::Post | Method::Put, Some(body)) if self.echo_writes => Ok(body.clone()),
            _ => Err(RequestError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Scripted [`HttpClient`] for tests
///
/// Clones share the same script, call log and gate.
///
/// # Example
///
/// ```
/// use roster_testing::http::{Method, MockHttpClient};
/// use serde_json::json;
///
/// let http = MockHttpClient::new()
///     .with_response(Method::Get, "http://api/users", Ok(json!([])))
///     .echo_writes();
/// assert!(http.calls().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct MockHttpClient {
    script: Arc<Mutex<Script>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockHttpClient {
    /// Create a mock with no scripted routes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for `method url` (builder form)
    #[must_use]
    pub fn with_response(self, method: Method, url: impl Into<String>, response: Response) -> Self {
        self.respond(method, url, response);
        self
    }

    /// Add a response for `method url`
    pub fn respond(&self, method: Method, url: impl Into<String>, response: Response) {
        self.lock()
            .routes
            .entry((method, url.into()))
            .or_default()
            .push_back(response);
    }

    /// Answer unscripted `POST`/`PUT` requests with their own body
    #[must_use]
    pub fn echo_writes(self) -> Self {
        self.lock().echo_writes = true;
        self
    }

    /// Hold every request until [`release`](Self::release) lets it through
    ///
    /// The call is recorded before it waits.
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `n` held requests (present or future) complete
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Every call received so far, in arrival order
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Number of calls received for `method url`
    #[must_use]
    pub fn calls_to(&self, method: Method, url: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.method == method && call.url == url)
            .count()
    }

    async fn handle(&self, method: Method, url: &str, body: Option<Value>) -> Response {
        self.lock().calls.push(RecordedCall {
            method,
            url: url.to_string(),
            body: body.clone(),
        });

        if let Some(gate) = &self.gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(RequestError::Transport("mock gate closed".to_string())),
            }
        }

        self.lock().next_response(method, url, body.as_ref())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for MockHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpClient")
            .field("calls", &self.lock().calls.len())
            .field("gated", &self.gate.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str) -> Result<Value, RequestError> {
        self.handle(Method::Get, url, None).await
    }

    async fn post(&self, url: &str, body: Value) -> Result<Value, RequestError> {
        self.handle(Method::Post, url, Some(body)).await
    }

    async fn put(&self, url: &str, body: Value) -> Result<Value, RequestError> {
        self.handle(Method::Put, url, Some(body)).await
    }

    async fn delete(&self, url: &str) -> Result<(), RequestError> {
        self.handle(Method::Delete, url, None).await.map(|_| ())
    }
}
