//! Pin the `api-version` query parameter to an operator-chosen value.
//!
//! SDK clients set `api-version` from their own compiled-in service version.
//! Installing [`ApiVersionOverridePolicy`] at
//! [`pipeline::PipelinePosition::PerCall`] makes every outgoing request carry
//! exactly one `api-version`, with the configured value, whatever the client
//! code asked for.

use async_trait::async_trait;
use pipeline::{ApiVersion, DecodeError, Next, PipelineError, Policy, Request, Response};

use crate::query_override::{override_query, override_request_query};

/// The reserved query key, in the casing written on the wire.
pub const API_VERSION_KEY: &str = "api-version";

/// Pipeline policy that enforces `api-version=<configured>` on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionOverridePolicy {
    api_version: ApiVersion,
}

impl ApiVersionOverridePolicy {
    /// Creates a policy enforcing `api_version`. An empty version is allowed
    /// and is written as `api-version=`.
    pub fn new(api_version: impl Into<ApiVersion>) -> Self {
        Self {
            api_version: api_version.into(),
        }
    }

    /// Returns the enforced version.
    pub fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns `raw` rewritten to carry only the configured `api-version`.
    pub fn rewrite_query(&self, raw: &str) -> Result<String, DecodeError> {
        override_query(raw, API_VERSION_KEY, self.api_version.as_str())
    }

    /// Rewrites `request`'s query in place without forwarding it.
    ///
    /// On error the query is left as it was.
    pub fn apply(&self, request: &mut Request) -> Result<(), DecodeError> {
        override_request_query(request, API_VERSION_KEY, self.api_version.as_str())
    }
}

#[async_trait]
impl Policy for ApiVersionOverridePolicy {
    fn name(&self) -> &str {
        "api_version_override"
    }

    fn process(&self, request: &mut Request, next: Next<'_>) -> Result<Response, PipelineError> {
        self.apply(request)?;
        next.run(request)
    }

    async fn process_async(
        &self,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response, PipelineError> {
        self.apply(request)?;
        next.run_async(request).await
    }
}
