use crate::client::ApiClient;
use crate::error::SyncError;
use crate::event::SyncEvent;
use crate::report;
use crate::status::RequestStatus;
use crate::store::{Action, Store};
use crate::transport::Transport;
use crate::types::{Envelope, LoginParams};

use super::SyncEngine;

/// Marks the app initialized when dropped, whatever the exit path.
struct InitGuard<'a> {
    store: &'a Store,
}

impl<'a> InitGuard<'a> {
    fn acquire(store: &'a Store) -> Self {
        store.dispatch(Action::SetAppInitialized(false));
        Self { store }
    }
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        self.store.dispatch(Action::SetAppInitialized(true));
    }
}

impl<T: Transport> SyncEngine<T> {
    /// Startup sequence: ask the server who we are, mark the app
    /// initialized, and load the todolists when a session exists.
    ///
    /// Returns whether a session exists.
    pub async fn initialize_app(&self) -> Result<bool, SyncError> {
        let logged_in = {
            let _init = InitGuard::acquire(&self.store);
            self.check_session().await?
        };
        tracing::info!(logged_in, "app initialized");
        if logged_in {
            self.fetch_todolists().await?;
        }
        Ok(logged_in)
    }

    /// `GET /auth/me`. A rejection means "no session" and is not an error.
    async fn check_session(&self) -> Result<bool, SyncError> {
        let _op = self.store.begin_operation();
        self.set_status(RequestStatus::Loading);

        let outcome = self.call(Ok(self.client.build_auth_me()), ApiClient::parse_auth_me).await;
        match outcome {
            Ok(Envelope::Accepted(me)) => {
                tracing::debug!(user_id = me.id, login = %me.login, "session found");
                self.store.dispatch(Action::SetLoggedIn(true));
                self.set_status(RequestStatus::Succeeded);
                Ok(true)
            }
            Ok(Envelope::Rejected(rejection)) => {
                tracing::debug!(result_code = rejection.result_code, "no session");
                self.store.dispatch(Action::SetLoggedIn(false));
                self.set_status(RequestStatus::Succeeded);
                Ok(false)
            }
            Err(e) => Err(report::network_failure(&self.store, &e)),
        }
    }

    /// Start a session. Returns the user id.
    pub async fn login(&self, params: &LoginParams) -> Result<u64, SyncError> {
        let _op = self.store.begin_operation();
        tracing::debug!(email = %params.email, "logging in");
        self.set_status(RequestStatus::Loading);

        let outcome = self.call(self.client.build_login(params), ApiClient::parse_login).await;
        let data = self.settle(outcome, |_| {})?;
        self.store.dispatch(Action::SetLoggedIn(true));
        Ok(data.user_id)
    }

    /// End the session and wipe all todolists and tasks.
    pub async fn logout(&self) -> Result<(), SyncError> {
        let _op = self.store.begin_operation();
        tracing::debug!("logging out");
        self.set_status(RequestStatus::Loading);

        let outcome = self.call(Ok(self.client.build_logout()), ApiClient::parse_logout).await;
        self.settle(outcome, |_| {})?;
        self.store.dispatch(Action::SetLoggedIn(false));
        self.store.dispatch(SyncEvent::SessionCleared);
        Ok(())
    }
}
