use crate::client::ApiClient;
use crate::error::SyncError;
use crate::event::SyncEvent;
use crate::report;
use crate::status::RequestStatus;
use crate::store::Action;
use crate::transport::Transport;
use crate::types::Todolist;

use super::SyncEngine;

impl<T: Transport> SyncEngine<T> {
    /// Replace the todolist collection with the server's, then (by default)
    /// load every list's tasks.
    pub async fn fetch_todolists(&self) -> Result<Vec<Todolist>, SyncError> {
        let todolists = {
            let _op = self.store.begin_operation();
            tracing::debug!("fetching todolists");
            self.set_status(RequestStatus::Loading);

            let outcome = self
                .call(Ok(self.client.build_get_todolists()), ApiClient::parse_get_todolists)
                .await;
            match outcome {
                Ok(todolists) => {
                    self.set_status(RequestStatus::Succeeded);
                    self.store.dispatch(SyncEvent::TodolistsFetched(todolists.clone()));
                    tracing::debug!(count = todolists.len(), "todolists fetched");
                    todolists
                }
                Err(e) => return Err(report::network_failure(&self.store, &e)),
            }
        };

        if self.options.fetch_tasks_on_load {
            for todolist in &todolists {
                // Failures are already reported in the store; keep loading the rest.
                let _ = self.fetch_tasks(&todolist.id).await;
            }
        }
        Ok(todolists)
    }

    /// Create a todolist; on success it is inserted at the head.
    pub async fn add_todolist(&self, title: &str) -> Result<Todolist, SyncError> {
        let _op = self.store.begin_operation();
        tracing::debug!(%title, "adding todolist");
        self.set_status(RequestStatus::Loading);

        let outcome = self
            .call(self.client.build_create_todolist(title), ApiClient::parse_create_todolist)
            .await;
        let todolist = self.settle(outcome, |_| {})?;
        self.store.dispatch(SyncEvent::TodolistAdded(todolist.clone()));
        tracing::debug!(todolist_id = %todolist.id, "todolist added");
        Ok(todolist)
    }

    /// Delete a todolist and, in the same dispatch, its task bucket.
    pub async fn remove_todolist(&self, todolist_id: &str) -> Result<String, SyncError> {
        let _op = self.store.begin_operation();
        tracing::debug!(%todolist_id, "removing todolist");
        self.set_status(RequestStatus::Loading);
        self.set_todolist_status(todolist_id, RequestStatus::Loading);

        let outcome = self
            .call(Ok(self.client.build_delete_todolist(todolist_id)), ApiClient::parse_delete_todolist)
            .await;
        self.settle(outcome, |rejected| {
            if let Some(status) = self.failed_entity_status(rejected) {
                self.set_todolist_status(todolist_id, status);
            }
        })?;
        self.set_todolist_status(todolist_id, RequestStatus::Succeeded);
        self.store.dispatch(SyncEvent::TodolistRemoved {
            todolist_id: todolist_id.to_string(),
        });
        Ok(todolist_id.to_string())
    }

    /// Rename a todolist in place.
    pub async fn rename_todolist(&self, todolist_id: &str, title: &str) -> Result<(String, String), SyncError> {
        let _op = self.store.begin_operation();
        tracing::debug!(%todolist_id, %title, "renaming todolist");
        self.set_status(RequestStatus::Loading);
        self.set_todolist_status(todolist_id, RequestStatus::Loading);

        let outcome = self
            .call(
                self.client.build_update_todolist(todolist_id, title),
                ApiClient::parse_update_todolist,
            )
            .await;
        self.settle(outcome, |rejected| {
            if let Some(status) = self.failed_entity_status(rejected) {
                self.set_todolist_status(todolist_id, status);
            }
        })?;
        self.set_todolist_status(todolist_id, RequestStatus::Succeeded);
        self.store.dispatch(SyncEvent::TodolistRenamed {
            todolist_id: todolist_id.to_string(),
            title: title.to_string(),
        });
        Ok((todolist_id.to_string(), title.to_string()))
    }

    fn set_todolist_status(&self, todolist_id: &str, status: RequestStatus) {
        self.store.dispatch(Action::SetTodolistEntityStatus {
            todolist_id: todolist_id.to_string(),
            status,
        });
    }
}
