//! Per-todolist task buckets and the partial-update merge.
//!
//! # Invariants
//! A bucket exists exactly for the todolists the store has seen confirmed:
//! created on fetch/add, dropped on remove or session clear. Events aimed at
//! a missing bucket (a stale fetch for a todolist removed meanwhile) are
//! ignored so no orphan bucket can appear.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::event::SyncEvent;
use crate::status::RequestStatus;
use crate::todolists::FilterValue;
use crate::types::{Task, TaskPriority, TaskStatus, UpdateTaskModel};

/// A server task plus its row status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDomain {
    #[serde(flatten)]
    pub task: Task,
    pub entity_status: RequestStatus,
}

impl TaskDomain {
    fn from_server(task: Task) -> Self {
        Self {
            task,
            entity_status: RequestStatus::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.task.id
    }
}

/// Fields to change on a task; `None` leaves the field as it is.
///
/// Nullable server fields use `Option<Option<_>>` so a patch can clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub start_date: Option<Option<NaiveDateTime>>,
    pub deadline: Option<Option<NaiveDateTime>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description.clone_from(description);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(start_date) = self.start_date {
            task.start_date = start_date;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
    }
}

/// Full update body: `task` with `patch` laid over it.
pub fn merge_patch(task: &Task, patch: &TaskPatch) -> UpdateTaskModel {
    let mut merged = task.clone();
    patch.apply_to(&mut merged);
    UpdateTaskModel {
        title: merged.title,
        description: merged.description,
        status: merged.status,
        priority: merged.priority,
        start_date: merged.start_date,
        deadline: merged.deadline,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TasksState {
    buckets: BTreeMap<String, Vec<TaskDomain>>,
}

impl TasksState {
    pub fn bucket(&self, todolist_id: &str) -> Option<&[TaskDomain]> {
        self.buckets.get(todolist_id).map(Vec::as_slice)
    }

    pub fn get(&self, todolist_id: &str, task_id: &str) -> Option<&TaskDomain> {
        self.bucket(todolist_id)?.iter().find(|t| t.id() == task_id)
    }

    pub fn todolist_ids(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Tasks of one todolist passing `filter`, in store order.
    pub fn visible(&self, todolist_id: &str, filter: FilterValue) -> Vec<&TaskDomain> {
        self.bucket(todolist_id)
            .unwrap_or_default()
            .iter()
            .filter(|t| match filter {
                FilterValue::All => true,
                FilterValue::Active => t.task.status != TaskStatus::Completed,
                FilterValue::Completed => t.task.status == TaskStatus::Completed,
            })
            .collect()
    }

    pub fn set_entity_status(&mut self, todolist_id: &str, task_id: &str, status: RequestStatus) {
        if let Some(task) = self.get_mut(todolist_id, task_id) {
            task.entity_status = status;
        }
    }

    pub fn apply(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::TodolistsFetched(todolists) => {
                self.buckets = todolists.iter().map(|tl| (tl.id.clone(), Vec::new())).collect();
            }
            SyncEvent::TodolistAdded(todolist) => {
                self.buckets.insert(todolist.id.clone(), Vec::new());
            }
            SyncEvent::TodolistRemoved { todolist_id } => {
                self.buckets.remove(todolist_id);
            }
            SyncEvent::TasksFetched { todolist_id, tasks } => match self.buckets.get_mut(todolist_id) {
                Some(bucket) => *bucket = tasks.iter().cloned().map(TaskDomain::from_server).collect(),
                None => tracing::debug!(%todolist_id, "dropping tasks for unknown todolist"),
            },
            SyncEvent::TaskAdded(task) => match self.buckets.get_mut(&task.todolist_id) {
                Some(bucket) => bucket.insert(0, TaskDomain::from_server(task.clone())),
                None => tracing::debug!(todolist_id = %task.todolist_id, "dropping task for unknown todolist"),
            },
            SyncEvent::TaskRemoved { todolist_id, task_id } => {
                if let Some(bucket) = self.buckets.get_mut(todolist_id) {
                    bucket.retain(|t| t.id() != task_id);
                }
            }
            SyncEvent::TaskUpdated {
                todolist_id,
                task_id,
                patch,
            } => {
                if let Some(task) = self.get_mut(todolist_id, task_id) {
                    patch.apply_to(&mut task.task);
                }
            }
            SyncEvent::SessionCleared => self.buckets.clear(),
            SyncEvent::TodolistRenamed { .. } => {}
        }
    }

    fn get_mut(&mut self, todolist_id: &str, task_id: &str) -> Option<&mut TaskDomain> {
        self.buckets
            .get_mut(todolist_id)?
            .iter_mut()
            .find(|t| t.id() == task_id)
    }
}
