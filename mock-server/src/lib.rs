use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "demo";
pub const DEMO_USER_ID: u64 = 1;
pub const MAX_TITLE_LENGTH: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todolist {
    pub id: String,
    pub title: String,
    pub added_date: NaiveDateTime,
    pub order: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "todoListId")]
    pub todolist_id: String,
    pub order: i32,
    pub status: u8,
    pub priority: u8,
    pub start_date: Option<NaiveDateTime>,
    pub deadline: Option<NaiveDateTime>,
    pub added_date: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct TitleInput {
    pub title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub status: u8,
    pub priority: u8,
    pub start_date: Option<NaiveDateTime>,
    pub deadline: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// `{resultCode, messages, data}` wrapper used by every mutating route.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub result_code: i32,
    pub messages: Vec<String>,
    pub data: Value,
}

/// Response of `GET /todo-lists/{id}/tasks`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksPage {
    pub items: Vec<Task>,
    pub total_count: usize,
    pub error: Option<String>,
}

/// Server-side data. Todolists and each task list are kept newest first.
#[derive(Debug, Default)]
pub struct ServerState {
    todolists: Vec<Todolist>,
    tasks: HashMap<String, Vec<Task>>,
    session: Option<u64>,
}

pub type Db = Arc<RwLock<ServerState>>;

/// Router with no data and no session.
pub fn app() -> Router {
    router(ServerState::default())
}

/// Router with no data and the demo user already logged in.
pub fn app_with_session() -> Router {
    router(ServerState {
        session: Some(DEMO_USER_ID),
        ..ServerState::default()
    })
}

fn router(state: ServerState) -> Router {
    let db: Db = Arc::new(RwLock::new(state));
    Router::new()
        .route("/todo-lists", get(list_todolists).post(create_todolist))
        .route("/todo-lists/{id}", put(update_todolist).delete(delete_todolist))
        .route("/todo-lists/{id}/tasks", get(list_tasks).post(create_task))
        .route("/todo-lists/{id}/tasks/{task_id}", put(update_task).delete(delete_task))
        .route("/auth/me", get(me))
        .route("/auth/login", post(login).delete(logout))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

fn accepted(data: Value) -> Json<ApiResponse> {
    Json(ApiResponse {
        result_code: 0,
        messages: Vec::new(),
        data,
    })
}

fn rejected(message: &str) -> Json<ApiResponse> {
    tracing::debug!(%message, "rejecting request");
    Json(ApiResponse {
        result_code: 1,
        messages: vec![message.to_string()],
        data: json!({}),
    })
}

fn validate_title(title: &str) -> Result<String, &'static str> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Title is required");
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err("Title should be at most 100 characters");
    }
    Ok(title.to_string())
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

// --- todolists ---

async fn list_todolists(State(db): State<Db>) -> Json<Vec<Todolist>> {
    Json(db.read().await.todolists.clone())
}

async fn create_todolist(State(db): State<Db>, Json(input): Json<TitleInput>) -> Json<ApiResponse> {
    let title = match validate_title(&input.title) {
        Ok(title) => title,
        Err(message) => return rejected(message),
    };
    let mut state = db.write().await;
    let order = state.todolists.first().map_or(0, |tl| tl.order - 1);
    let todolist = Todolist {
        id: Uuid::new_v4().to_string(),
        title,
        added_date: now(),
        order,
    };
    state.todolists.insert(0, todolist.clone());
    state.tasks.insert(todolist.id.clone(), Vec::new());
    tracing::info!(id = %todolist.id, "todolist created");
    accepted(json!({ "item": todolist }))
}

async fn update_todolist(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<TitleInput>,
) -> Json<ApiResponse> {
    let title = match validate_title(&input.title) {
        Ok(title) => title,
        Err(message) => return rejected(message),
    };
    let mut state = db.write().await;
    match state.todolists.iter_mut().find(|tl| tl.id == id) {
        Some(todolist) => {
            todolist.title = title;
            accepted(json!({}))
        }
        None => rejected("Todolist not found"),
    }
}

async fn delete_todolist(State(db): State<Db>, Path(id): Path<String>) -> Json<ApiResponse> {
    let mut state = db.write().await;
    let before = state.todolists.len();
    state.todolists.retain(|tl| tl.id != id);
    if state.todolists.len() == before {
        return rejected("Todolist not found");
    }
    state.tasks.remove(&id);
    tracing::info!(%id, "todolist deleted");
    accepted(json!({}))
}

// --- tasks ---

async fn list_tasks(State(db): State<Db>, Path(id): Path<String>) -> Json<TasksPage> {
    let state = db.read().await;
    match state.tasks.get(&id) {
        Some(tasks) => Json(TasksPage {
            items: tasks.clone(),
            total_count: tasks.len(),
            error: None,
        }),
        None => Json(TasksPage {
            items: Vec::new(),
            total_count: 0,
            error: Some("Todolist not found".to_string()),
        }),
    }
}

async fn create_task(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<TitleInput>,
) -> Json<ApiResponse> {
    let title = match validate_title(&input.title) {
        Ok(title) => title,
        Err(message) => return rejected(message),
    };
    let mut state = db.write().await;
    let Some(tasks) = state.tasks.get_mut(&id) else {
        return rejected("Todolist not found");
    };
    let order = tasks.first().map_or(0, |t| t.order - 1);
    let task = Task {
        id: Uuid::new_v4().to_string(),
        title,
        description: None,
        todolist_id: id,
        order,
        status: 0,
        priority: 1,
        start_date: None,
        deadline: None,
        added_date: now(),
    };
    tasks.insert(0, task.clone());
    accepted(json!({ "item": task }))
}

async fn update_task(
    State(db): State<Db>,
    Path((id, task_id)): Path<(String, String)>,
    Json(input): Json<UpdateTaskInput>,
) -> Json<ApiResponse> {
    let title = match validate_title(&input.title) {
        Ok(title) => title,
        Err(message) => return rejected(message),
    };
    if input.status > 3 || input.priority > 4 {
        return rejected("Invalid status or priority");
    }
    let mut state = db.write().await;
    let Some(task) = state
        .tasks
        .get_mut(&id)
        .and_then(|tasks| tasks.iter_mut().find(|t| t.id == task_id))
    else {
        return rejected("Task not found");
    };
    task.title = title;
    task.description = input.description;
    task.status = input.status;
    task.priority = input.priority;
    task.start_date = input.start_date;
    task.deadline = input.deadline;
    accepted(json!({ "item": task.clone() }))
}

async fn delete_task(State(db): State<Db>, Path((id, task_id)): Path<(String, String)>) -> Json<ApiResponse> {
    let mut state = db.write().await;
    let Some(tasks) = state.tasks.get_mut(&id) else {
        return rejected("Todolist not found");
    };
    let before = tasks.len();
    tasks.retain(|t| t.id != task_id);
    if tasks.len() == before {
        return rejected("Task not found");
    }
    accepted(json!({}))
}

// --- auth ---

async fn me(State(db): State<Db>) -> Json<ApiResponse> {
    match db.read().await.session {
        Some(id) => accepted(json!({ "id": id, "email": DEMO_EMAIL, "login": "demo" })),
        None => rejected("You are not authorized"),
    }
}

async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> Json<ApiResponse> {
    if input.email != DEMO_EMAIL || input.password != DEMO_PASSWORD {
        return rejected("Incorrect Email or Password");
    }
    db.write().await.session = Some(DEMO_USER_ID);
    tracing::info!(remember_me = input.remember_me, "logged in");
    accepted(json!({ "userId": DEMO_USER_ID }))
}

async fn logout(State(db): State<Db>) -> Json<ApiResponse> {
    db.write().await.session = None;
    accepted(json!({}))
}
