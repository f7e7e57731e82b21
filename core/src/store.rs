//! Root state, the action reducer and the shared store handle.
//!
//! # Design
//! All slices live in one `RootState` behind a single mutex. `dispatch`
//! takes the lock once and runs one reducer, so concurrent thunks never
//! observe each other's partial writes. Thunk outcomes arrive as
//! [`Action::Sync`] and are broadcast to both domain slices.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::auth::AuthState;
use crate::event::SyncEvent;
use crate::status::{AppState, RequestStatus};
use crate::tasks::{TaskDomain, TasksState};
use crate::todolists::{FilterValue, TodolistDomain, TodolistsState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetAppStatus(RequestStatus),
    SetAppError(Option<String>),
    SetAppInitialized(bool),
    SetLoggedIn(bool),
    ChangeTodolistFilter {
        todolist_id: String,
        filter: FilterValue,
    },
    SetTodolistEntityStatus {
        todolist_id: String,
        status: RequestStatus,
    },
    SetTaskEntityStatus {
        todolist_id: String,
        task_id: String,
        status: RequestStatus,
    },
    Sync(SyncEvent),
}

impl From<SyncEvent> for Action {
    fn from(event: SyncEvent) -> Self {
        Self::Sync(event)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootState {
    pub app: AppState,
    pub auth: AuthState,
    pub todolists: TodolistsState,
    pub tasks: TasksState,
}

impl RootState {
    pub fn reduce(&mut self, action: Action) {
        match action {
            Action::SetAppStatus(status) => self.app.set_status(status),
            Action::SetAppError(error) => self.app.set_error(error),
            Action::SetAppInitialized(flag) => self.app.set_initialized(flag),
            Action::SetLoggedIn(flag) => self.auth.set_logged_in(flag),
            Action::ChangeTodolistFilter { todolist_id, filter } => {
                self.todolists.change_filter(&todolist_id, filter);
            }
            Action::SetTodolistEntityStatus { todolist_id, status } => {
                self.todolists.set_entity_status(&todolist_id, status);
            }
            Action::SetTaskEntityStatus {
                todolist_id,
                task_id,
                status,
            } => self.tasks.set_entity_status(&todolist_id, &task_id, status),
            Action::Sync(event) => {
                self.todolists.apply(&event);
                self.tasks.apply(&event);
            }
        }
    }
}

/// Cloneable handle to the shared root state.
#[derive(Debug, Clone, Default)]
pub struct Store {
    state: Arc<Mutex<RootState>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: impl Into<Action>) {
        self.state.lock().reduce(action.into());
    }

    /// Run `f` against the current state under the lock.
    pub fn select<R>(&self, f: impl FnOnce(&RootState) -> R) -> R {
        let guard = self.state.lock();
        f(&*guard)
    }

    pub fn snapshot(&self) -> RootState {
        self.select(RootState::clone)
    }

    // --- selectors ---

    pub fn todolists(&self) -> Vec<TodolistDomain> {
        self.select(|s| s.todolists.as_slice().to_vec())
    }

    pub fn tasks(&self) -> TasksState {
        self.select(|s| s.tasks.clone())
    }

    pub fn tasks_of(&self, todolist_id: &str) -> Vec<TaskDomain> {
        self.select(|s| s.tasks.bucket(todolist_id).map(<[_]>::to_vec).unwrap_or_default())
    }

    /// Tasks of a todolist after applying that todolist's own filter.
    pub fn visible_tasks(&self, todolist_id: &str) -> Vec<TaskDomain> {
        self.select(|s| {
            let filter = s
                .todolists
                .get(todolist_id)
                .map_or(FilterValue::All, |tl| tl.filter);
            s.tasks
                .visible(todolist_id, filter)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn status(&self) -> RequestStatus {
        self.select(|s| s.app.status)
    }

    pub fn error(&self) -> Option<String> {
        self.select(|s| s.app.error.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.select(|s| s.auth.is_logged_in)
    }

    pub fn is_initialized(&self) -> bool {
        self.select(|s| s.app.is_initialized)
    }

    pub fn in_flight(&self) -> usize {
        self.select(|s| s.app.in_flight)
    }

    /// True while any operation is pending, regardless of `status`.
    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    /// Counts an operation as in flight until the guard drops.
    pub(crate) fn begin_operation(&self) -> OperationGuard {
        self.state.lock().app.operation_started();
        OperationGuard { store: self.clone() }
    }
}

#[must_use]
pub(crate) struct OperationGuard {
    store: Store,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.store.state.lock().app.operation_settled();
    }
}
