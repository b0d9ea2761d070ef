//! HTTP transport over `reqwest`.
//!
//! The async path uses a [`reqwest::Client`] built up front. The blocking path
//! uses a [`reqwest::blocking::Client`], which starts its own internal runtime
//! and therefore must not be created inside an async context. It is built on
//! the first blocking send instead.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pipeline::{Method, Request, Response, StatusCode, Transport, TransportError};

/// Settings shared by the async and blocking clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Whole-request timeout (connect, send, and read the body).
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("apiver/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ---------------------------------------------------------------------------

/// Terminal pipeline stage that sends requests over HTTP(S).
///
/// If a blocking send has been made, drop this value outside any async
/// runtime; dropping a blocking `reqwest` client inside one panics.
#[derive(Debug)]
pub struct HttpTransport {
    config: TransportConfig,
    client: reqwest::Client,
    blocking: OnceLock<reqwest::blocking::Client>,
}

impl HttpTransport {
    /// Creates a transport with the given settings.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised or the user agent is
    /// not a valid header value.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self {
            config,
            client,
            blocking: OnceLock::new(),
        })
    }

    /// Returns the settings this transport was built with.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn blocking_client(&self) -> Result<&reqwest::blocking::Client, TransportError> {
        if let Some(client) = self.blocking.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent.as_str())
            .build()
            .map_err(map_reqwest_error)?;
        Ok(self.blocking.get_or_init(|| client))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let started = Instant::now();
        let client = self.blocking_client()?;

        let mut builder =
            client.request(to_reqwest_method(request.method()), request.uri().as_url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().map_err(map_reqwest_error)?;
        let status = StatusCode::new(response.status().as_u16());
        let headers = collect_headers(response.headers());
        let body = response.bytes().map_err(map_reqwest_error)?.to_vec();

        log_received(request, status, body.len(), started);
        Ok(Response {
            status,
            headers,
            body,
        })
    }

    async fn send_async(&self, request: &Request) -> Result<Response, TransportError> {
        let started = Instant::now();

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method()), request.uri().as_url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = StatusCode::new(response.status().as_u16());
        let headers = collect_headers(response.headers());
        let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

        log_received(request, status, body.len(), started);
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

// ---------------------------------------------------------------------------

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

fn log_received(request: &Request, status: StatusCode, bytes: usize, started: Instant) {
    tracing::debug!(
        request_id = %request.id(),
        status = status.as_u16(),
        bytes,
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Response received"
    );
}

/// Maps a `reqwest` failure onto the transport error taxonomy.
fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect {
            message: err.to_string(),
        }
    } else if err.is_builder() {
        TransportError::InvalidRequest {
            message: err.to_string(),
        }
    } else {
        TransportError::Other {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_identifies_client() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("apiver/"));
    }

    #[test]
    fn test_methods_map_one_to_one() {
        assert_eq!(to_reqwest_method(Method::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest_method(Method::Head), reqwest::Method::HEAD);
    }
}
