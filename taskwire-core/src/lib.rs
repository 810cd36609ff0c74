//! Core wire types for taskwire
//!
//! This crate defines everything the client crate needs to speak the task
//! protocol but nothing about the connection itself:
//!
//! - **envelope**: outbound single-element array framing, inbound data and
//!   error envelopes, the authentication frame
//! - **task**: task kinds, statuses, routing capabilities, typed results
//! - **models**: request/response payloads per task domain
//! - **error**: the error taxonomy shared by all taskwire crates

pub mod envelope;
pub mod error;
pub mod models;
pub mod task;

pub use envelope::{DataEnvelope, ErrorEnvelope, ErrorFrame, ItemHeader};
pub use error::{ApiError, Error, Result, TimeoutError};
pub use task::{ResultCountProvider, TaskIdentifiable, TaskResult, TaskStatus, TaskType};
