//! Confirmed outcomes broadcast to every domain store.
//!
//! Each variant is emitted only after the server accepted the corresponding
//! request. The root store hands every event to both the todolist and the
//! task store, which pick out what concerns them; the stores never call
//! each other.

use crate::tasks::TaskPatch;
use crate::types::{Task, Todolist};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    TodolistsFetched(Vec<Todolist>),
    TodolistAdded(Todolist),
    TodolistRemoved { todolist_id: String },
    TodolistRenamed { todolist_id: String, title: String },
    TasksFetched { todolist_id: String, tasks: Vec<Task> },
    TaskAdded(Task),
    TaskRemoved { todolist_id: String, task_id: String },
    TaskUpdated {
        todolist_id: String,
        task_id: String,
        patch: TaskPatch,
    },
    /// Logout or any other session reset: wipe all domain state.
    SessionCleared,
}
