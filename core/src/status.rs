//! App-wide request status, latest error and initialization flag.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a request, used both globally and per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Global status slice.
///
/// `status` is last-write-wins across concurrent operations. `in_flight`
/// counts operations that have started and not yet settled, so "is anything
/// pending" can be answered without trusting `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppState {
    pub status: RequestStatus,
    pub error: Option<String>,
    pub is_initialized: bool,
    pub in_flight: usize,
}

impl AppState {
    pub fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn set_initialized(&mut self, is_initialized: bool) {
        self.is_initialized = is_initialized;
    }

    pub(crate) fn operation_started(&mut self) {
        self.in_flight += 1;
    }

    pub(crate) fn operation_settled(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}
