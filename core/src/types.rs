//! Wire DTOs for the todolist API.
//!
//! # Design
//! These mirror the server's JSON (camelCase field names, integer task
//! status/priority) but are defined independently from the mock-server crate;
//! integration tests catch schema drift. Client-local fields such as the
//! todolist filter or entity status never appear here.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A todolist as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todolist {
    pub id: String,
    pub title: String,
    pub added_date: NaiveDateTime,
    pub order: i32,
}

/// Task lifecycle state. Serialized as its ordinal (0-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskStatus {
    #[default]
    New = 0,
    InProgress = 1,
    Completed = 2,
    Draft = 3,
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for TaskStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::New),
            1 => Ok(Self::InProgress),
            2 => Ok(Self::Completed),
            3 => Ok(Self::Draft),
            other => Err(format!("unknown task status {other}")),
        }
    }
}

/// Task priority. Serialized as its ordinal (0-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskPriority {
    #[default]
    Low = 0,
    Middle = 1,
    Hi = 2,
    Urgently = 3,
    Later = 4,
}

impl From<TaskPriority> for u8 {
    fn from(priority: TaskPriority) -> Self {
        priority as u8
    }
}

impl TryFrom<u8> for TaskPriority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Low),
            1 => Ok(Self::Middle),
            2 => Ok(Self::Hi),
            3 => Ok(Self::Urgently),
            4 => Ok(Self::Later),
            other => Err(format!("unknown task priority {other}")),
        }
    }
}

/// A task as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "todoListId")]
    pub todolist_id: String,
    pub order: i32,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub deadline: Option<NaiveDateTime>,
    pub added_date: NaiveDateTime,
}

/// Full task body sent with `PUT /todo-lists/{id}/tasks/{taskId}`.
///
/// Every field is always serialized: the server replaces the whole task, so
/// an omitted field would be cleared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskModel {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub start_date: Option<NaiveDateTime>,
    pub deadline: Option<NaiveDateTime>,
}

/// Body for creating a todolist, renaming one, or creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleBody {
    pub title: String,
}

/// `data` payload of create responses: `{"item": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemData<T> {
    pub item: T,
}

/// Response of `GET /todo-lists/{id}/tasks`. Not wrapped in an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTasksResponse {
    pub items: Vec<Task>,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub error: Option<String>,
}

/// `data` payload of `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MeData {
    pub id: u64,
    pub email: String,
    pub login: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginParams {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captcha: Option<String>,
}

/// `data` payload of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user_id: u64,
}

/// A structurally valid response whose `resultCode` is not zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub result_code: i32,
    pub messages: Vec<String>,
}

/// Decoded `{resultCode, messages, data}` envelope.
///
/// `data` is only decoded when `resultCode == 0`; rejected responses carry
/// an empty object there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<D> {
    Accepted(D),
    Rejected(Rejection),
}

/// Raw envelope before `data` is interpreted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEnvelope {
    pub result_code: i32,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}
