//! Pipeline assembly and the two commands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use pipeline::{Method, Pipeline, PipelinePosition, Request, RequestUri, Transport};
use policies::{ApiVersionOverridePolicy, LoggingPolicy, QueryParameterOverridePolicy};
use serde::Serialize;
use transport::{DryRunTransport, HttpTransport, TransportConfig};

use crate::config::ClientConfig;

/// Builds the chain: configured default-query overrides, then the
/// `api-version` override (per call), then logging (per retry), then
/// `transport`.
///
/// A `default_query` entry for `api-version` is therefore always superseded
/// by the configured `api_version`.
pub fn build_pipeline(client: &ClientConfig, transport: Arc<dyn Transport>) -> Pipeline {
    let builder = client
        .default_query
        .iter()
        .fold(Pipeline::builder(transport), |builder, (key, value)| {
            builder.add_policy(
                QueryParameterOverridePolicy::new(key.as_str(), value.as_str()),
                PipelinePosition::PerCall,
            )
        });
    builder
        .add_policy(
            ApiVersionOverridePolicy::new(client.api_version.clone()),
            PipelinePosition::PerCall,
        )
        .add_policy(LoggingPolicy::new(), PipelinePosition::PerRetry)
        .build()
}

/// Resolves `target` as an absolute URI, or relative to `endpoint`.
pub fn resolve_target(endpoint: Option<&str>, target: &str) -> anyhow::Result<RequestUri> {
    match (RequestUri::parse(target), endpoint) {
        (Ok(uri), _) => Ok(uri),
        (Err(_), Some(endpoint)) => {
            let base = RequestUri::parse(endpoint)
                .with_context(|| format!("invalid endpoint '{endpoint}'"))?;
            base.join(target)
                .with_context(|| format!("cannot resolve '{target}' against '{endpoint}'"))
        }
        (Err(err), None) => Err(err).with_context(|| {
            format!("'{target}' is not an absolute URI and no endpoint is configured")
        }),
    }
}

// ---------------------------------------------------------------------------

/// Runs `target` through the chain without sending it and returns the URI
/// the transport would have received.
pub async fn rewrite(client: &ClientConfig, target: &str) -> anyhow::Result<String> {
    let uri = resolve_target(client.endpoint.as_deref(), target)?;
    let dry_run = Arc::new(DryRunTransport::new());
    let pipeline = build_pipeline(client, dry_run.clone());

    let mut request = Request::new(Method::Get, uri);
    pipeline
        .send_async(&mut request)
        .await
        .context("request could not be rewritten")?;
    Ok(request.uri().to_string())
}

/// What `send` prints on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendSummary {
    /// Correlation id, matching the `request_id` field in log events.
    pub request_id: String,
    /// URI as actually sent.
    pub uri: String,
    /// Response status code.
    pub status: u16,
    /// Response body size.
    pub bytes: usize,
}

/// Options for [`send`].
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Target, absolute or relative to the configured endpoint.
    pub target: String,
    /// Request method.
    pub method: Method,
    /// `name: value` headers.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<String>,
}

/// Sends one request through the full chain over HTTP.
pub async fn send(client: &ClientConfig, options: SendOptions) -> anyhow::Result<SendSummary> {
    let uri = resolve_target(client.endpoint.as_deref(), &options.target)?;
    let transport = HttpTransport::new(TransportConfig {
        timeout: Duration::from_secs(client.timeout_secs),
        ..TransportConfig::default()
    })
    .context("failed to build HTTP client")?;
    let pipeline = build_pipeline(client, Arc::new(transport));

    let mut request = options
        .headers
        .into_iter()
        .fold(Request::new(options.method, uri), |request, (name, value)| {
            request.with_header(name, value)
        });
    if let Some(body) = options.body {
        request = request.with_body(body);
    }

    let response = pipeline
        .send_async(&mut request)
        .await
        .with_context(|| format!("request to {} failed", request.uri()))?;

    Ok(SendSummary {
        request_id: request.id().to_string(),
        uri: request.uri().to_string(),
        status: response.status.as_u16(),
        bytes: response.body.len(),
    })
}

/// Splits a `name: value` header argument.
pub fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("header '{raw}' must look like 'name: value'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header '{raw}' has an empty name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
