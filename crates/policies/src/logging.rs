//! Structured request/response events.
//!
//! Place [`LoggingPolicy`] at [`pipeline::PipelinePosition::PerRetry`] so it
//! observes the URI as the transport will send it, after every per-call
//! rewrite has run.

use std::time::Instant;

use async_trait::async_trait;
use pipeline::{Next, PipelineError, Policy, Request, Response};

/// Logs each request before forwarding and its outcome afterwards.
///
/// Never alters the request or the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPolicy;

impl LoggingPolicy {
    /// Creates the policy.
    pub fn new() -> Self {
        Self
    }

    fn before(&self, request: &Request) -> Instant {
        tracing::debug!(
            request_id = %request.id(),
            method = %request.method(),
            uri = %request.uri(),
            "Sending request"
        );
        Instant::now()
    }

    fn after(&self, request: &Request, started: Instant, result: &Result<Response, PipelineError>) {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match result {
            Ok(response) if response.is_success() => tracing::info!(
                request_id = %request.id(),
                status = response.status.as_u16(),
                elapsed_ms,
                "Request completed"
            ),
            Ok(response) => tracing::warn!(
                request_id = %request.id(),
                status = response.status.as_u16(),
                elapsed_ms,
                "Request completed with non-success status"
            ),
            Err(err) => tracing::warn!(
                request_id = %request.id(),
                error = %err,
                retry_policy = ?err.retry_policy(),
                elapsed_ms,
                "Request failed"
            ),
        }
    }
}

#[async_trait]
impl Policy for LoggingPolicy {
    fn name(&self) -> &str {
        "logging"
    }

    fn process(&self, request: &mut Request, next: Next<'_>) -> Result<Response, PipelineError> {
        let started = self.before(request);
        let result = next.run(request);
        self.after(request, started, &result);
        result
    }

    async fn process_async(
        &self,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response, PipelineError> {
        let started = self.before(request);
        let result = next.run_async(request).await;
        self.after(request, started, &result);
        result
    }
}
