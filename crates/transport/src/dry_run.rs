//! A transport that records what would have been sent.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use pipeline::{Request, Response, StatusCode, Transport, TransportError};

/// Header set on every synthetic response.
pub const DRY_RUN_HEADER: &str = "x-dry-run";

/// Terminal stage that answers `200 OK` without touching the network and
/// remembers the final URI of every request it receives.
#[derive(Debug, Default)]
pub struct DryRunTransport {
    sent: Mutex<Vec<String>>,
}

impl DryRunTransport {
    /// Creates a transport with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the URIs received so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, request: &Request) -> Response {
        let uri = request.uri().to_string();
        tracing::debug!(request_id = %request.id(), uri = %uri, "Dry run: request not sent");
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(uri);

        let mut response = Response::new(StatusCode::OK);
        response
            .headers
            .push((DRY_RUN_HEADER.to_string(), "true".to_string()));
        response
    }
}

#[async_trait]
impl Transport for DryRunTransport {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        Ok(self.record(request))
    }

    async fn send_async(&self, request: &Request) -> Result<Response, TransportError> {
        Ok(self.record(request))
    }
}
