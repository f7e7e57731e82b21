//! Turns failed calls into the user-visible error state.
//!
//! Every thunk routes its failure paths through here, so the error text and
//! the `failed` status are derived in exactly one place.

use crate::error::{ApiError, CallError, SyncError};
use crate::status::RequestStatus;
use crate::store::{Action, Store};
use crate::types::Rejection;

/// Shown when the server or the transport gives nothing better.
pub const GENERIC_ERROR: &str = "Some error occurred";

/// Text for a domain rejection: the first server message as sent, or the
/// fallback when there is none or it is empty.
pub fn rejection_message(rejection: &Rejection) -> String {
    rejection
        .messages
        .first()
        .filter(|m| !m.is_empty())
        .map_or(GENERIC_ERROR, String::as_str)
        .to_string()
}

/// Text for a call that produced no usable response.
///
/// Error bodies of the form `{"message": "..."}` win over the status line.
pub fn network_message(err: &CallError) -> String {
    if let CallError::Api(ApiError::HttpError { body, .. }) = err {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
        if let Some(message) = message.filter(|m| !m.trim().is_empty()) {
            return message;
        }
    }
    let message = err.to_string();
    if message.trim().is_empty() {
        GENERIC_ERROR.to_string()
    } else {
        message
    }
}

/// Record a non-zero result code in the store.
pub(crate) fn server_rejection(store: &Store, rejection: &Rejection) -> SyncError {
    let message = rejection_message(rejection);
    tracing::warn!(result_code = rejection.result_code, %message, "server rejected request");
    publish(store, &message);
    SyncError::Rejected {
        result_code: rejection.result_code,
        message,
    }
}

/// Record a transport or protocol failure in the store.
pub(crate) fn network_failure(store: &Store, err: &CallError) -> SyncError {
    let message = network_message(err);
    tracing::warn!(error = %err, "request failed");
    publish(store, &message);
    SyncError::Network { message }
}

fn publish(store: &Store, message: &str) {
    store.dispatch(Action::SetAppError(Some(message.to_string())));
    store.dispatch(Action::SetAppStatus(RequestStatus::Failed));
}
