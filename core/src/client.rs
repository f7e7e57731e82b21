//! Stateless HTTP request builder and response parser for the todolist API.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and an optional API key and carries no
//! mutable state between calls. Each endpoint is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. Parsers check the HTTP status and JSON shape only;
//! deciding what a non-zero `resultCode` means is left to the sync engine.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Envelope, GetTasksResponse, ItemData, LoginData, LoginParams, MeData, RawEnvelope, Rejection,
    Task, TitleBody, Todolist, UpdateTaskModel,
};

/// Header carrying the API key on every request when one is configured.
pub const API_KEY_HEADER: &str = "API-KEY";

/// Synchronous, stateless client for the todolist API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    // --- todolists ---

    pub fn build_get_todolists(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/todo-lists")
    }

    pub fn build_create_todolist(&self, title: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/todo-lists", &TitleBody { title: title.to_string() })
    }

    pub fn build_delete_todolist(&self, todolist_id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/todo-lists/{todolist_id}"))
    }

    pub fn build_update_todolist(&self, todolist_id: &str, title: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Put,
            &format!("/todo-lists/{todolist_id}"),
            &TitleBody { title: title.to_string() },
        )
    }

    pub fn parse_get_todolists(&self, response: HttpResponse) -> Result<Vec<Todolist>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_create_todolist(&self, response: HttpResponse) -> Result<Envelope<Todolist>, ApiError> {
        self.parse_item(response)
    }

    pub fn parse_delete_todolist(&self, response: HttpResponse) -> Result<Envelope<()>, ApiError> {
        parse_ack(&response)
    }

    pub fn parse_update_todolist(&self, response: HttpResponse) -> Result<Envelope<()>, ApiError> {
        parse_ack(&response)
    }

    // --- tasks ---

    pub fn build_get_tasks(&self, todolist_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/todo-lists/{todolist_id}/tasks"))
    }

    pub fn build_create_task(&self, todolist_id: &str, title: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            &format!("/todo-lists/{todolist_id}/tasks"),
            &TitleBody { title: title.to_string() },
        )
    }

    pub fn build_delete_task(&self, todolist_id: &str, task_id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/todo-lists/{todolist_id}/tasks/{task_id}"))
    }

    pub fn build_update_task(
        &self,
        todolist_id: &str,
        task_id: &str,
        model: &UpdateTaskModel,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/todo-lists/{todolist_id}/tasks/{task_id}"), model)
    }

    pub fn parse_get_tasks(&self, response: HttpResponse) -> Result<GetTasksResponse, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Envelope<Task>, ApiError> {
        self.parse_item(response)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<Envelope<()>, ApiError> {
        parse_ack(&response)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Envelope<Task>, ApiError> {
        self.parse_item(response)
    }

    // --- auth ---

    pub fn build_auth_me(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/auth/me")
    }

    pub fn build_login(&self, params: &LoginParams) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/login", params)
    }

    pub fn build_logout(&self) -> HttpRequest {
        self.request(HttpMethod::Delete, "/auth/login")
    }

    pub fn parse_auth_me(&self, response: HttpResponse) -> Result<Envelope<MeData>, ApiError> {
        parse_envelope(&response)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<Envelope<LoginData>, ApiError> {
        parse_envelope(&response)
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<Envelope<()>, ApiError> {
        parse_ack(&response)
    }

    fn parse_item<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<Envelope<T>, ApiError> {
        let envelope: Envelope<ItemData<T>> = parse_envelope(&response)?;
        Ok(match envelope {
            Envelope::Accepted(data) => Envelope::Accepted(data.item),
            Envelope::Rejected(rejection) => Envelope::Rejected(rejection),
        })
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(key) = &self.api_key {
            headers.push((API_KEY_HEADER.to_string(), key.clone()));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body: None,
        }
    }

    fn json_request<B: Serialize>(&self, method: HttpMethod, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn parse_raw(response: &HttpResponse) -> Result<RawEnvelope, ApiError> {
    check_status(response, 200)?;
    decode(&response.body)
}

fn parse_envelope<D: DeserializeOwned>(response: &HttpResponse) -> Result<Envelope<D>, ApiError> {
    let raw = parse_raw(response)?;
    if raw.result_code != 0 {
        return Ok(Envelope::Rejected(Rejection {
            result_code: raw.result_code,
            messages: raw.messages,
        }));
    }
    serde_json::from_value(raw.data)
        .map(Envelope::Accepted)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Envelopes whose `data` carries nothing the caller needs.
fn parse_ack(response: &HttpResponse) -> Result<Envelope<()>, ApiError> {
    let raw = parse_raw(response)?;
    if raw.result_code != 0 {
        return Ok(Envelope::Rejected(Rejection {
            result_code: raw.result_code,
            messages: raw.messages,
        }));
    }
    Ok(Envelope::Accepted(()))
}
