//! Ordered collection of todolists with client-local filter and row status.

use serde::{Deserialize, Serialize};

use crate::event::SyncEvent;
use crate::status::RequestStatus;
use crate::types::Todolist;

/// Which tasks of a todolist the UI shows. Never sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterValue {
    #[default]
    All,
    Active,
    Completed,
}

/// A server todolist plus client-only state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodolistDomain {
    #[serde(flatten)]
    pub todolist: Todolist,
    pub filter: FilterValue,
    pub entity_status: RequestStatus,
}

impl TodolistDomain {
    fn from_server(todolist: Todolist) -> Self {
        Self {
            todolist,
            filter: FilterValue::All,
            entity_status: RequestStatus::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.todolist.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TodolistsState {
    items: Vec<TodolistDomain>,
}

impl TodolistsState {
    pub fn as_slice(&self) -> &[TodolistDomain] {
        &self.items
    }

    pub fn get(&self, todolist_id: &str) -> Option<&TodolistDomain> {
        self.items.iter().find(|tl| tl.id() == todolist_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn change_filter(&mut self, todolist_id: &str, filter: FilterValue) {
        if let Some(tl) = self.get_mut(todolist_id) {
            tl.filter = filter;
        }
    }

    pub fn set_entity_status(&mut self, todolist_id: &str, status: RequestStatus) {
        if let Some(tl) = self.get_mut(todolist_id) {
            tl.entity_status = status;
        }
    }

    pub fn apply(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::TodolistsFetched(todolists) => {
                self.items = todolists.iter().cloned().map(TodolistDomain::from_server).collect();
            }
            SyncEvent::TodolistAdded(todolist) => {
                self.items.insert(0, TodolistDomain::from_server(todolist.clone()));
            }
            SyncEvent::TodolistRemoved { todolist_id } => {
                self.items.retain(|tl| tl.id() != todolist_id);
            }
            SyncEvent::TodolistRenamed { todolist_id, title } => {
                if let Some(tl) = self.get_mut(todolist_id) {
                    tl.todolist.title.clone_from(title);
                }
            }
            SyncEvent::SessionCleared => self.items.clear(),
            SyncEvent::TasksFetched { .. }
            | SyncEvent::TaskAdded(_)
            | SyncEvent::TaskRemoved { .. }
            | SyncEvent::TaskUpdated { .. } => {}
        }
    }

    fn get_mut(&mut self, todolist_id: &str) -> Option<&mut TodolistDomain> {
        self.items.iter_mut().find(|tl| tl.id() == todolist_id)
    }
}
