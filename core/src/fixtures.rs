//! Server-shaped records for unit tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::{Task, TaskPriority, TaskStatus, Todolist};

pub(crate) fn added_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap()
}

pub(crate) fn todolist(id: &str, title: &str) -> Todolist {
    Todolist {
        id: id.to_string(),
        title: title.to_string(),
        added_date: added_date(),
        order: 0,
    }
}

pub(crate) fn task(id: &str, todolist_id: &str, title: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        todolist_id: todolist_id.to_string(),
        order: 0,
        status: TaskStatus::New,
        priority: TaskPriority::Low,
        start_date: None,
        deadline: None,
        added_date: added_date(),
    }
}
