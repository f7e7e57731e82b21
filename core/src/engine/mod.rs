//! Asynchronous operations that keep the store in step with the server.
//!
//! # Protocol
//! Every operation sets the global status to `loading`, performs one
//! request, and then settles on exactly one of three paths:
//! - accepted: status `succeeded`, then one [`SyncEvent`] is dispatched;
//! - rejected (`resultCode != 0`): the error is reported, no store mutation;
//! - no usable response: the error is reported, no store mutation.
//!
//! Operations on an existing row (remove, rename, task update) also drive
//! that row's `entity_status`. Store mutations only ever follow a confirmed
//! success, so a failed operation leaves the domain slices untouched.
//!
//! [`SyncEvent`]: crate::event::SyncEvent

mod app;
mod tasks;
mod todolists;

use crate::client::ApiClient;
use crate::error::{ApiError, CallError, SyncError};
use crate::http::{HttpRequest, HttpResponse};
use crate::report;
use crate::status::RequestStatus;
use crate::store::{Action, Store};
use crate::transport::Transport;
use crate::types::Envelope;

/// Behaviour switches for [`SyncEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// After fetching todolists, fetch every list's tasks.
    pub fetch_tasks_on_load: bool,
    /// Mark a row `failed` (instead of leaving it `loading`) when its
    /// request gets no usable response.
    pub fail_entity_on_network_error: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fetch_tasks_on_load: true,
            fail_entity_on_network_error: false,
        }
    }
}

/// Runs sync operations against a [`Transport`] and records their outcome
/// in a shared [`Store`].
#[derive(Debug)]
pub struct SyncEngine<T> {
    client: ApiClient,
    transport: T,
    store: Store,
    options: EngineOptions,
}

impl<T: Transport> SyncEngine<T> {
    pub fn new(client: ApiClient, transport: T, store: Store) -> Self {
        Self {
            client,
            transport,
            store,
            options: EngineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build, execute and parse one request.
    async fn call<R>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&ApiClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, CallError> {
        let request = request?;
        let response = self.transport.execute(request).await?;
        Ok(parse(&self.client, response)?)
    }

    fn set_status(&self, status: RequestStatus) {
        self.store.dispatch(Action::SetAppStatus(status));
    }

    /// Settle an envelope-returning call on the accepted, rejected or
    /// network path. `on_failure` runs on both failure paths, after the
    /// error has been reported, with `true` for a domain rejection.
    fn settle<D>(
        &self,
        outcome: Result<Envelope<D>, CallError>,
        on_failure: impl FnOnce(bool),
    ) -> Result<D, SyncError> {
        match outcome {
            Ok(Envelope::Accepted(data)) => {
                self.set_status(RequestStatus::Succeeded);
                Ok(data)
            }
            Ok(Envelope::Rejected(rejection)) => {
                let err = report::server_rejection(&self.store, &rejection);
                on_failure(true);
                Err(err)
            }
            Err(e) => {
                let err = report::network_failure(&self.store, &e);
                on_failure(false);
                Err(err)
            }
        }
    }

    /// Entity status to apply after a failure, if any.
    fn failed_entity_status(&self, rejected: bool) -> Option<RequestStatus> {
        (rejected || self.options.fail_entity_on_network_error).then_some(RequestStatus::Failed)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport shared by the engine tests.

    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use crate::http::{HttpRequest, HttpResponse};
    use crate::transport::{Transport, TransportError};

    #[derive(Debug, Default)]
    pub(crate) struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        pub(crate) requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn reply_json(self, body: serde_json::Value) -> Self {
            self.replies.lock().push_back(Ok(HttpResponse::ok_json(body.to_string())));
            self
        }

        pub(crate) fn accept(self, data: serde_json::Value) -> Self {
            self.reply_json(serde_json::json!({"resultCode": 0, "messages": [], "data": data}))
        }

        pub(crate) fn reject(self, messages: &[&str]) -> Self {
            self.reply_json(serde_json::json!({"resultCode": 1, "messages": messages, "data": {}}))
        }

        pub(crate) fn fail(self, message: &str) -> Self {
            self.replies
                .lock()
                .push_back(Err(TransportError::Request(message.to_string())));
            self
        }

        pub(crate) fn sent(&self) -> Vec<HttpRequest> {
            self.requests.lock().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().push(request);
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Request("no scripted reply".to_string())))
        }
    }
}
