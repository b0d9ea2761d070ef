//! Terminal stages for the request pipeline.
//!
//! Implements the [`pipeline::Transport`] trait twice:
//!
//! - [`HttpTransport`] sends over HTTP(S) with `reqwest`, on either the async
//!   or the blocking path, matching the path the pipeline was driven on.
//! - [`DryRunTransport`] sends nothing and records the final URI of every
//!   request, for previews and tests.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection handling, TLS, timeouts, and the mapping of
//! client failures to [`pipeline::TransportError`] live here. The
//! [`pipeline`] crate sees only [`pipeline::Transport`].

pub mod dry_run;
pub mod http;

pub use dry_run::{DryRunTransport, DRY_RUN_HEADER};
pub use http::{HttpTransport, TransportConfig};
