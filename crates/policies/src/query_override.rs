//! Enforce a single, fixed value for one query parameter on every request.
//!
//! The rewrite decodes the existing query, drops every occurrence of the
//! reserved key (compared ignoring ASCII case), appends `key=value` last, and
//! re-encodes. All other pairs keep their decoded values and relative order.
//! Applying the rewrite twice gives the same query as applying it once.

use async_trait::async_trait;
use pipeline::{DecodeError, Next, ParsedQuery, PipelineError, Policy, Request, Response};

/// Rewrites `raw` so that `key` occurs exactly once, with `value`, at the end.
///
/// # Errors
///
/// Returns the [`DecodeError`] of the first malformed token in `raw`.
pub fn override_query(raw: &str, key: &str, value: &str) -> Result<String, DecodeError> {
    let mut query = ParsedQuery::parse(raw)?;
    query.override_parameter(key, value);
    Ok(query.encode())
}

/// Applies [`override_query`] to `request` in place.
///
/// On error the request's query is left untouched.
pub(crate) fn override_request_query(
    request: &mut Request,
    key: &str,
    value: &str,
) -> Result<(), DecodeError> {
    let rewritten = match override_query(request.uri().query(), key, value) {
        Ok(rewritten) => rewritten,
        Err(err) => {
            tracing::warn!(
                request_id = %request.id(),
                key,
                error = %err,
                "Existing query could not be decoded; request not sent"
            );
            return Err(err);
        }
    };
    request.uri_mut().set_query(&rewritten);
    tracing::trace!(request_id = %request.id(), key, value, "Query parameter enforced");
    Ok(())
}

// ---------------------------------------------------------------------------

/// Pipeline policy that pins an arbitrary query parameter to a fixed value.
///
/// Stateless apart from its configuration; safe to share across concurrent
/// sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameterOverridePolicy {
    key: String,
    value: String,
}

impl QueryParameterOverridePolicy {
    /// Creates a policy that enforces `key=value`.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the enforced key, in the casing that will be written.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the enforced value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Rewrites `request`'s query without forwarding it.
    pub fn apply(&self, request: &mut Request) -> Result<(), DecodeError> {
        override_request_query(request, &self.key, &self.value)
    }
}

#[async_trait]
impl Policy for QueryParameterOverridePolicy {
    fn name(&self) -> &str {
        "query_parameter_override"
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

#[cfg(test)]
mod tests {
    use pipeline::{Method, RequestUri};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_override_query_replaces_case_insensitively() {
        assert_eq!(
            override_query("Deployment=a&x=1&DEPLOYMENT=b", "deployment", "gpt-4o").expect("valid"),
            "x=1&deployment=gpt-4o"
        );
    }

    #[test]
    fn test_override_query_normalises_surviving_pairs() {
        assert_eq!(
            override_query("flag&name=%7Ejo", "k", "v").expect("valid"),
            "flag=&name=~jo&k=v"
        );
    }

    #[test]
    fn test_apply_leaves_query_untouched_on_error() {
        let policy = QueryParameterOverridePolicy::new("k", "v");
        let mut request = Request::new(
            Method::Get,
            RequestUri::parse("https://example.com/?a=%zz").expect("valid uri"),
        );

        let err = policy.apply(&mut request).expect_err("malformed");

        assert!(matches!(err, DecodeError::IncompleteEscape { .. }));
        assert_eq!(request.uri().query(), "a=%zz");
    }
}
