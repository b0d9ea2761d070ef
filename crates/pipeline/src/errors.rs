//! Error and retry-classification types for the request pipeline.
//!
//! [`PipelineError`] is what every chain entry point returns. It wraps the
//! narrower component errors: [`DecodeError`] from the query model and
//! [`TransportError`] from the terminal stage.
//!
//! [`RetryPolicy`] is a classification only. Nothing in this crate retries;
//! a retrying stage (if the embedding application installs one) reads it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether a failed send is safe to repeat and, if so, after what delay.
///
/// - `Retryable`: connection refused/reset, timeouts.
/// - `NonRetryable`: malformed requests, local encoding failures, anything
///   the server would reject again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Query decoding
// ---------------------------------------------------------------------------

/// A query component could not be percent-decoded.
///
/// Decoding is strict: a `%` must always introduce exactly two hex digits and
/// the decoded bytes must form valid UTF-8. No partial recovery is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A `%` was not followed by two hexadecimal digits.
    #[error("Incomplete percent escape at byte {offset} in '{segment}'")]
    IncompleteEscape {
        /// The raw (still encoded) key or value being decoded.
        segment: String,
        /// Byte offset of the offending `%` within `segment`.
        offset: usize,
    },

    /// The escapes decoded to a byte sequence that is not UTF-8.
    #[error("Percent-decoded bytes of '{segment}' are not valid UTF-8")]
    InvalidUtf8 {
        /// The raw (still encoded) key or value being decoded.
        segment: String,
    },
}

impl DecodeError {
    /// Returns the raw segment that failed to decode.
    pub fn segment(&self) -> &str {
        match self {
            Self::IncompleteEscape { segment, .. } | Self::InvalidUtf8 { segment } => segment,
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Failures raised by the terminal [`crate::Transport`] stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection to the remote host could not be established.
    #[error("Connection failed: {message}")]
    Connect {
        /// Description reported by the underlying client.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built from the pipeline message.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what could not be converted.
        message: String,
    },

    /// Any other client-side failure.
    #[error("Transport error: {message}")]
    Other {
        /// Description reported by the underlying client.
        message: String,
    },
}

impl TransportError {
    /// Classifies this failure for a retrying stage.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Connect { .. } | Self::Timeout => RetryPolicy::Retryable { after: None },
            Self::InvalidRequest { .. } | Self::Other { .. } => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors returned from [`crate::Pipeline::send`] and every [`crate::Policy`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A policy could not decode the request's existing query string.
    ///
    /// The request was not forwarded; its query is left as it was.
    #[error("Malformed query encoding: {0}")]
    MalformedEncoding(#[from] DecodeError),

    /// The terminal stage failed to deliver the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A policy rejected the request for a reason of its own.
    #[error("Policy '{policy}' failed: {message}")]
    Policy {
        /// Name of the failing policy (see [`crate::Policy::name`]).
        policy: String,
        /// Human-readable description of the failure.
        message: String,
    },
}

impl PipelineError {
    /// Classifies this failure for a retrying stage.
    ///
    /// Only transport failures can ever be retryable; local failures would
    /// recur on every attempt.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Transport(err) => err.retry_policy(),
            Self::MalformedEncoding(_) | Self::Policy { .. } => RetryPolicy::NonRetryable,
        }
    }
}
