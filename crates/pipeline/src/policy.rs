//! Port definitions for chain links.
//!
//! A [`Policy`] sees the request before the rest of the chain does, and the
//! response after. A [`Transport`] is the terminal stage that actually puts
//! the request on the wire.
//!
//! Both traits expose a blocking and a suspendable entry point. A policy must
//! forward through the variant it was called with: `process` forwards with
//! [`Next::run`], `process_async` with [`Next::run_async`]. Mixing them would
//! block an async caller or spin up a runtime inside a blocking one.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{PipelineError, Request, Response, TransportError};

/// One link in the request pipeline.
///
/// Implementations are shared across concurrent sends, so any state must be
/// immutable after construction (or internally synchronised).
#[async_trait]
pub trait Policy: Send + Sync + std::fmt::Debug {
    /// Short, stable name used in logs and [`PipelineError::Policy`].
    fn name(&self) -> &str;

    /// Handles `request` on the blocking path.
    ///
    /// Call `next.run(request)` to continue the chain, or return without
    /// calling it to short-circuit.
    fn process(&self, request: &mut Request, next: Next<'_>) -> Result<Response, PipelineError>;

    /// Handles `request` on the suspendable path.
    ///
    /// Call `next.run_async(request).await` to continue the chain.
    async fn process_async(
        &self,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response, PipelineError>;
}

/// The terminal stage of a pipeline.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Sends `request` and waits for the response on the calling thread.
    fn send(&self, request: &Request) -> Result<Response, TransportError>;

    /// Sends `request` without blocking the executor.
    async fn send_async(&self, request: &Request) -> Result<Response, TransportError>;
}

// ---------------------------------------------------------------------------

/// The remainder of the chain after the current policy.
///
/// `run` and `run_async` take `self` by value: a policy can forward a given
/// request at most once.
#[derive(Debug)]
pub struct Next<'a> {
    policies: &'a [Arc<dyn Policy>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    /// Creates a continuation over `policies`, ending at `transport`.
    pub fn new(policies: &'a [Arc<dyn Policy>], transport: &'a dyn Transport) -> Self {
        Self {
            policies,
            transport,
        }
    }

    /// Returns the number of policies still to run before the transport.
    pub fn remaining(&self) -> usize {
        self.policies.len()
    }

    /// Continues the chain on the blocking path.
    pub fn run(self, request: &mut Request) -> Result<Response, PipelineError> {
        match self.policies.split_first() {
            Some((policy, rest)) => policy.process(request, Next::new(rest, self.transport)),
            None => Ok(self.transport.send(request)?),
        }
    }

    /// Continues the chain on the suspendable path.
    pub async fn run_async(self, request: &mut Request) -> Result<Response, PipelineError> {
        match self.policies.split_first() {
            Some((policy, rest)) => {
                policy
                    .process_async(request, Next::new(rest, self.transport))
                    .await
            }
            None => Ok(self.transport.send_async(request).await?),
        }
    }
}
