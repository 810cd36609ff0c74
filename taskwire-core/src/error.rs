//! Error types for taskwire
//!
//! This module provides comprehensive error handling for task-processing
//! operations. It defines three main error types:
//!
//! - **Error**: Application-level errors for internal use (uses thiserror)
//! - **ApiError**: Structured service errors received over the wire
//! - **TimeoutError**: Response-wait timeouts with progress diagnostics
//!
//! # Error Hierarchy
//!
//! The `Error` enum covers all error conditions that can occur while talking
//! to the service, from transport failures to malformed responses. Service
//! errors arrive as `ApiError` values routed back to the waiting caller by
//! correlation identifier.
//!
//! # Retryability
//!
//! `ApiError::is_retryable` classifies service errors by their error code so
//! callers can decide whether to resubmit. `Error::is_timeout` distinguishes
//! response-wait timeouts from hard failures, which matters for pollers that
//! treat a poll-level timeout as transient.
//!
//! # Examples
//!
//! ```rust
//! use taskwire_core::{ApiError, Error};
//!
//! let api = ApiError::new("too many requests", "rateLimitExceeded");
//! assert!(api.is_retryable());
//!
//! let error = Error::Api(api);
//! assert!(!error.is_timeout());
//! ```

use std::time::{Duration, SystemTime};

use thiserror::Error;

/// Result type for taskwire operations
///
/// This is a convenience type alias that uses the taskwire `Error` type.
/// Used throughout the taskwire crates for consistent error handling.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes the service marks as transient.
///
/// Matching is case-insensitive and by substring, since some deployments
/// prefix codes with a subsystem name.
const RETRYABLE_ERROR_IDS: [&str; 4] = [
    "ratelimitexceeded",
    "serviceunavailable",
    "timeout",
    "temporaryerror",
];

/// Application-level error type for taskwire operations
///
/// This enum represents all possible error conditions that can occur while
/// sending tasks and waiting for their results.
///
/// # Error Categories
///
/// - **Lifecycle errors**: NotConnected, AlreadyConnected, ConnectionClosed
/// - **Authentication errors**: InvalidApiKey, Authentication
/// - **Request/response errors**: InvalidRequest, InvalidResponse, Api
/// - **Transport errors**: WebSocket, Serialization
/// - **Operational errors**: Timeout, TaskFailed, PollingExhausted
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Operation requires an active connection
    ///
    /// Returned by `send` and friends when the transport is disconnected.
    /// Callers should connect (or wait for auto-reconnect) and retry.
    #[error("not connected")]
    NotConnected,

    /// Connect was called on an already-connected transport
    #[error("already connected")]
    AlreadyConnected,

    /// The connection was closed
    ///
    /// The WebSocket connection is no longer active. Further operations
    /// will fail until reconnection occurs.
    #[error("connection closed")]
    ConnectionClosed,

    /// No API key was provided and none was found in the environment
    #[error("invalid or missing API key")]
    InvalidApiKey,

    /// The authentication frame could not be delivered or was rejected
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The request is malformed and was never sent
    ///
    /// For example an empty correlation identifier, or an empty batch.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The service replied, but the payload could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Structured error returned by the service for a specific task
    #[error("{0}")]
    Api(ApiError),

    /// The response wait exceeded its deadline
    ///
    /// Carries diagnostics about how many results were expected and how
    /// many had arrived when the deadline passed.
    #[error("{0}")]
    Timeout(TimeoutError),

    /// WebSocket transport layer error
    ///
    /// Covers connection issues, protocol violations, or frame processing
    /// errors below the task protocol.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Serialization or deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An async task finished in the `error` terminal state
    #[error("task {task_uuid} failed")]
    TaskFailed {
        /// Correlation identifier of the failed task
        task_uuid: String,
    },

    /// A poll loop ran out of attempts without reaching a terminal state
    ///
    /// Distinct from `Timeout`: every individual poll may have succeeded,
    /// the task simply never left the `processing` state within budget.
    #[error("polling exhausted after {attempts} attempts")]
    PollingExhausted {
        /// Number of poll attempts made before giving up
        attempts: u32,
    },
}

impl Error {
    /// Whether this error is a response-wait timeout.
    ///
    /// Pollers use this to tell a transient per-poll timeout (retry) apart
    /// from a hard failure (abort).
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

/// Structured error returned by the service for a specific task
///
/// The service reports failures either as a bare error object or inside an
/// `errors` list; both shapes decode into this type. The historical wire
/// format carries the human message in either `error` or `message` and the
/// machine code in either `errorId` or `code`.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Human-readable description of the failure
    pub message: String,
    /// Machine-readable error code, empty if the service omitted it
    pub error_id: String,
    /// Correlation identifier of the failed task, empty for connection-level errors
    pub task_uuid: String,
    /// Wire name of the task kind, empty if unknown
    pub task_type: String,
    /// The raw frame the error was decoded from
    pub raw_response: String,
    /// When the error was received by the client
    pub timestamp: SystemTime,
}

impl ApiError {
    pub fn new(message: impl Into<String>, error_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_id: error_id.into(),
            task_uuid: String::new(),
            task_type: String::new(),
            raw_response: String::new(),
            timestamp: SystemTime::now(),
        }
    }

    /// Whether the service considers this failure transient.
    ///
    /// True for rate limiting, service unavailability, server-side timeouts
    /// and explicitly temporary errors. Callers may resubmit the same task
    /// with a fresh correlation identifier.
    pub fn is_retryable(&self) -> bool {
        let id = self.error_id.to_lowercase();
        RETRYABLE_ERROR_IDS.iter().any(|r| id.contains(r))
    }
}

impl std::fmt::Display for ApiError {
    /// Formats as " | "-joined parts, skipping fields the service omitted.
    ///
    /// For example: "API error | Task: imageInference | Code: rateLimitExceeded | Message: too many requests"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "API error")?;
        if !self.task_type.is_empty() {
            write!(f, " | Task: {}", self.task_type)?;
        }
        if !self.error_id.is_empty() {
            write!(f, " | Code: {}", self.error_id)?;
        }
        if !self.message.is_empty() {
            write!(f, " | Message: {}", self.message)?;
        }
        if !self.task_uuid.is_empty() {
            write!(f, " | TaskUUID: {}", self.task_uuid)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl From<ApiError> for Error {
    fn from(e: ApiError) -> Self {
        Error::Api(e)
    }
}

/// Response-wait timeout with progress diagnostics
///
/// Produced when the waiter's deadline passes before the expected number of
/// results arrived. For multi-result requests the display reports partial
/// progress so the caller can tell "slow fan-out" from "nothing at all".
#[derive(Debug, Clone)]
pub struct TimeoutError {
    /// Wire name of the task kind that timed out
    pub task_type: String,
    /// Correlation identifier of the request
    pub task_uuid: String,
    /// Wall-clock time spent waiting
    pub elapsed: Duration,
    /// Number of results the request asked for
    pub expected_count: usize,
    /// Number of results that arrived before the deadline
    pub received_count: usize,
}

impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.expected_count > 1 {
            write!(
                f,
                "timeout after {:.1?} waiting for {} (taskUUID: {}): received {}/{} results",
                self.elapsed, self.task_type, self.task_uuid, self.received_count, self.expected_count
            )
        } else {
            write!(
                f,
                "timeout after {:.1?} waiting for {} (taskUUID: {}): no response received",
                self.elapsed, self.task_type, self.task_uuid
            )
        }
    }
}

impl std::error::Error for TimeoutError {}

impl From<TimeoutError> for Error {
    fn from(e: TimeoutError) -> Self {
        Error::Timeout(e)
    }
}
