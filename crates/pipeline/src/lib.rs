//! Outbound HTTP request pipeline.
//!
//! This crate defines the message types, the ordered query model, and the
//! port traits of a request pipeline: an ordered chain of [`Policy`] links
//! ending at one [`Transport`]. Policy implementations live in `policies`;
//! transports live in `transport`.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies. It
//! defines *what* a chain link receives and how it forwards; infrastructure
//! crates define *how* requests reach the network.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`message`] | `Request`, `Response`, `RequestUri`, `Method` |
//! | [`query`] | `ParsedQuery`, `QueryParam`, and the strict percent codec |
//! | [`policy`] | `Policy` and `Transport` traits, the `Next` continuation |
//! | [`chain`] | `Pipeline`, `PipelineBuilder`, `PipelinePosition` |
//! | [`identifiers`] | `RequestId` |
//! | [`types`] | `ApiVersion`, `StatusCode` |
//! | [`errors`] | `PipelineError`, `TransportError`, `DecodeError`, `RetryPolicy` |

pub mod chain;
pub mod errors;
pub mod identifiers;
pub mod message;
pub mod policy;
pub mod query;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use chain::{Pipeline, PipelineBuilder, PipelinePosition};
pub use errors::{DecodeError, PipelineError, RetryPolicy, TransportError};
pub use identifiers::RequestId;
pub use message::{Method, Request, RequestUri, Response};
pub use policy::{Next, Policy, Transport};
pub use query::{decode_component, encode_component, ParsedQuery, QueryParam};
pub use types::{ApiVersion, StatusCode};
