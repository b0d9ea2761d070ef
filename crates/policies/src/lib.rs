//! Request pipeline policy implementations.
//!
//! | Policy | Effect |
//! |--------|--------|
//! | [`ApiVersionOverridePolicy`] | Every request carries exactly one `api-version`, set to the configured value |
//! | [`QueryParameterOverridePolicy`] | Same rewrite for any other reserved key |
//! | [`LoggingPolicy`] | Structured events before and after the rest of the chain |
//!
//! ## Architectural Layer
//!
//! **Chain links.** Policies act only on the [`pipeline::Request`] handed to
//! them and forward through [`pipeline::Next`]. They perform no I/O; the
//! transport is reached only via the chain.

pub mod api_version;
pub mod logging;
pub mod query_override;

pub use api_version::{ApiVersionOverridePolicy, API_VERSION_KEY};
pub use logging::LoggingPolicy;
pub use query_override::{override_query, QueryParameterOverridePolicy};
