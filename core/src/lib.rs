//! Client-side synchronization core for the todolist service.
//!
//! # Overview
//! Keeps an in-memory store of todolists and their tasks consistent with a
//! remote server that owns the data. Every change is confirmed by the server
//! before it touches the store; failures become a global error message and a
//! `failed` status instead of propagating as panics or partial writes.
//!
//! # Design
//! - `ApiClient` builds `HttpRequest` values and parses `HttpResponse` values
//!   without touching the network (host-does-IO). A [`Transport`] moves them.
//! - [`Store`] holds all state behind one lock; every reducer is one atomic
//!   dispatch. Thunk outcomes are broadcast as [`SyncEvent`]s to both the
//!   todolist and the task slice.
//! - [`SyncEngine`] runs the async operations and is the only writer of
//!   confirmed domain changes.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod http;
pub mod report;
pub mod status;
pub mod store;
pub mod tasks;
pub mod todolists;
pub mod transport;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use client::ApiClient;
pub use config::{ConfigArgs, ConfigError, SyncConfig};
pub use engine::{EngineOptions, SyncEngine};
pub use error::{ApiError, CallError, SyncError};
pub use event::SyncEvent;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use status::RequestStatus;
pub use store::{Action, RootState, Store};
pub use tasks::{merge_patch, TaskDomain, TaskPatch};
pub use todolists::{FilterValue, TodolistDomain};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{Envelope, LoginParams, Rejection, Task, TaskPriority, TaskStatus, Todolist, UpdateTaskModel};
