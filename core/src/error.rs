//! Error types for the wire client and the sync engine.
//!
//! # Design
//! `ApiError` describes a response the client could not use at all (bad
//! status, bad JSON). A response that parses but carries a non-zero
//! `resultCode` is not an `ApiError`; it surfaces as [`Envelope::Rejected`]
//! and becomes [`SyncError::Rejected`] in the engine.
//!
//! [`Envelope::Rejected`]: crate::types::Envelope::Rejected

use crate::transport::TransportError;

/// Errors returned by `ApiClient` build and parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// Why a sync operation settled in the rejected state.
///
/// By the time a caller sees one of these, the global error and status have
/// already been written to the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The server answered with a non-zero result code.
    #[error("rejected by server (code {result_code}): {message}")]
    Rejected { result_code: i32, message: String },

    /// No usable response: transport failure, bad status or bad body.
    #[error("network error: {message}")]
    Network { message: String },

    /// `update_task` was asked to patch a task that is not in the store.
    #[error("task {task_id} not found in todolist {todolist_id}")]
    TaskNotFound { todolist_id: String, task_id: String },
}

/// Anything that can go wrong between building a request and decoding the
/// response.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
