//! `reqwest`-backed [`HttpClient`]
//!
//! Non-2xx responses become [`RequestError::Status`], transport problems
//! become [`RequestError::Transport`] (a timed-out request reads `"timeout"`)
//! and unreadable bodies become [`RequestError::Decode`].

use roster_core::{HttpClient, RequestError};
use serde_json::Value;
use std::time::Duration;

/// Request capability over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client whose requests fail after `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Transport`] if the TLS backend cannot be
    /// initialised.
    pub fn new(timeout: Duration) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn transport(error: &reqwest::Error) -> RequestError {
    if error.is_timeout() {
        RequestError::Transport("timeout".to_string())
    } else {
        RequestError::Transport(error.to_string())
    }
}

fn check_status(url: &str, response: &reqwest::Response) -> Result<(), RequestError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(RequestError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

async fn json_body(url: &str, response: reqwest::Response) -> Result<Value, RequestError> {
    check_status(url, &response)?;
    response
        .json::<Value>()
        .await
        .map_err(|e| RequestError::Decode(e.to_string()))
}

impl HttpClient for ReqwestClient {
    #[tracing::instrument(skip(self), name = "http_get")]
    async fn get(&self, url: &str) -> Result<Value, RequestError> {
        let response = self.client.get(url).send().await.map_err(|e| transport(&e))?;
        json_body(url, response).await
    }

    #[tracing::instrument(skip(self, body), name = "http_post")]
    async fn post(&self, url: &str, body: Value) -> Result<Value, RequestError> {
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport(&e))?;
        json_body(url, response).await
    }

    #[tracing::instrument(skip(self, body), name = "http_put")]
    async fn put(&self, url: &str, body: Value) -> Result<Value, RequestError> {
        let response = self
            .client
            .put(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport(&e))?;
        json_body(url, response).await
    }

    #[tracing::instrument(skip(self), name = "http_delete")]
    async fn delete(&self, url: &str) -> Result<(), RequestError> {
        let response = self.client.delete(url).send().await.map_err(|e| transport(&e))?;
        check_status(url, &response)
    }
}
