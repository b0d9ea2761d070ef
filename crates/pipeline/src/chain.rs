//! The ordered policy chain.
//!
//! A [`Pipeline`] is a fixed list of policies followed by one transport. It
//! is immutable once built and cheap to clone, so a single instance can serve
//! any number of concurrent sends.

use std::sync::Arc;

use tracing::Instrument;

use crate::{Next, PipelineError, Policy, Request, Response, Transport};

/// Where a policy is placed relative to the others.
///
/// Per-call policies run first, then per-retry policies, then the transport.
/// A retrying stage would sit between the two groups, re-running only the
/// per-retry ones; this crate does not provide one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelinePosition {
    /// Runs once per logical call.
    PerCall,
    /// Runs once per attempt, closest to the transport.
    PerRetry,
}

// ---------------------------------------------------------------------------

/// Collects policies and a transport into a [`Pipeline`].
#[derive(Debug)]
pub struct PipelineBuilder {
    per_call: Vec<Arc<dyn Policy>>,
    per_retry: Vec<Arc<dyn Policy>>,
    transport: Arc<dyn Transport>,
}

impl PipelineBuilder {
    /// Starts a pipeline that ends at `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            per_call: Vec::new(),
            per_retry: Vec::new(),
            transport,
        }
    }

    /// Adds `policy` at `position`. Within a position, policies run in the
    /// order they were added.
    #[must_use]
    pub fn add_policy<P: Policy + 'static>(self, policy: P, position: PipelinePosition) -> Self {
        self.add_shared_policy(Arc::new(policy), position)
    }

    /// Adds an already shared policy at `position`.
    #[must_use]
    pub fn add_shared_policy(mut self, policy: Arc<dyn Policy>, position: PipelinePosition) -> Self {
        match position {
            PipelinePosition::PerCall => self.per_call.push(policy),
            PipelinePosition::PerRetry => self.per_retry.push(policy),
        }
        self
    }

    /// Freezes the chain.
    pub fn build(self) -> Pipeline {
        let policies: Vec<Arc<dyn Policy>> =
            self.per_call.into_iter().chain(self.per_retry).collect();
        Pipeline {
            policies: policies.into(),
            transport: self.transport,
        }
    }
}

// ---------------------------------------------------------------------------

/// An immutable, shareable request pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    policies: Arc<[Arc<dyn Policy>]>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    /// Starts building a pipeline that ends at `transport`.
    pub fn builder(transport: Arc<dyn Transport>) -> PipelineBuilder {
        PipelineBuilder::new(transport)
    }

    /// Returns the policy names in execution order.
    pub fn policy_names(&self) -> Vec<&str> {
        self.policies.iter().map(|policy| policy.name()).collect()
    }

    /// Sends `request` through every policy and the transport, blocking the
    /// calling thread.
    ///
    /// `request` is left as the policies modified it, so callers can inspect
    /// what was actually sent.
    pub fn send(&self, request: &mut Request) -> Result<Response, PipelineError> {
        let span = tracing::debug_span!(
            "pipeline_send",
            request_id = %request.id(),
            method = %request.method()
        );
        let _guard = span.enter();
        Next::new(&self.policies, self.transport.as_ref()).run(request)
    }

    /// Sends `request` through every policy and the transport without
    /// blocking the executor.
    pub async fn send_async(&self, request: &mut Request) -> Result<Response, PipelineError> {
        let span = tracing::debug_span!(
            "pipeline_send",
            request_id = %request.id(),
            method = %request.method()
        );
        Next::new(&self.policies, self.transport.as_ref())
            .run_async(request)
            .instrument(span)
            .await
    }
}
