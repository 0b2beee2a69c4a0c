//! JSON-over-HTTP transport shared by the OpenAI-compatible providers

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;

const TRANSPORT: &str = "http";

/// POST a JSON body and decode a JSON reply
///
/// Non-2xx replies become `DomainError::Provider` carrying status and body.
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &Value,
    ) -> Result<Value, DomainError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests fail once `timeout` has elapsed, connect time included
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map(|inner| Self { inner })
            .map_err(|e| DomainError::configuration(format!("HTTP client setup failed: {}", e)))
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &Value,
    ) -> Result<Value, DomainError> {
        let request = headers
            .into_iter()
            .fold(self.inner.post(url), |req, (name, value)| req.header(name, value));

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::provider(TRANSPORT, format!("POST {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                TRANSPORT,
                format!("HTTP {} from {}: {}", status.as_u16(), url, detail),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DomainError::provider(TRANSPORT, format!("Undecodable reply: {}", e)))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Canned {
        Reply(Value),
        Fail(String),
    }

    /// Client answering with canned JSON keyed by URL
    #[derive(Default)]
    pub struct MockHttpClient {
        canned: Mutex<HashMap<String, Canned>>,
        bodies: Mutex<Vec<Value>>,
    }

    impl std::fmt::Debug for MockHttpClient {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MockHttpClient").finish_non_exhaustive()
        }
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: Value) -> Self {
            self.canned.lock().unwrap().insert(url.into(), Canned::Reply(response));
            self
        }

        pub fn with_error(self, url: impl Into<String>, error: impl Into<String>) -> Self {
            self.canned.lock().unwrap().insert(url.into(), Canned::Fail(error.into()));
            self
        }

        /// Request bodies received so far
        pub fn bodies(&self) -> Vec<Value> {
            self.bodies.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            _headers: Vec<(&str, &str)>,
            body: &Value,
        ) -> Result<Value, DomainError> {
            self.bodies.lock().unwrap().push(body.clone());

            match self.canned.lock().unwrap().get(url) {
                Some(Canned::Reply(value)) => Ok(value.clone()),
                Some(Canned::Fail(error)) => Err(DomainError::provider("mock", error)),
                None => Err(DomainError::provider("mock", format!("nothing canned for {}", url))),
            }
        }
    }
}
