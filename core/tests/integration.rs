//! Full sync lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every engine
//! operation over real HTTP through `UreqTransport`, checking the store after
//! each step. Catches schema drift between the core DTOs and the server.

use todo_sync::{
    ApiClient, LoginParams, RequestStatus, Store, SyncEngine, SyncError, TaskPatch, TaskStatus, UreqTransport,
};

/// Serve the mock API on a random local port and return its base URL.
async fn start_server(with_session: bool) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = if with_session {
        mock_server::app_with_session()
    } else {
        mock_server::app()
    };
    tokio::spawn(mock_server::serve(listener, router));
    format!("http://{addr}")
}

fn engine(base_url: &str) -> SyncEngine<UreqTransport> {
    SyncEngine::new(ApiClient::new(base_url), UreqTransport::new(), Store::new())
}

fn demo_login() -> LoginParams {
    LoginParams {
        email: mock_server::DEMO_EMAIL.to_string(),
        password: mock_server::DEMO_PASSWORD.to_string(),
        remember_me: true,
        captcha: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sync_lifecycle() {
    let base_url = start_server(false).await;
    let engine = engine(&base_url);
    let store = engine.store().clone();

    // Step 1: initialize without a session -- initialized, nothing fetched.
    assert!(!engine.initialize_app().await.unwrap());
    assert!(store.is_initialized());
    assert!(!store.is_logged_in());
    assert!(store.error().is_none());

    // Step 2: wrong password is a domain rejection.
    let mut bad = demo_login();
    bad.password = "nope".to_string();
    let err = engine.login(&bad).await.unwrap_err();
    assert!(matches!(err, SyncError::Rejected { .. }));
    assert_eq!(store.error().as_deref(), Some("Incorrect Email or Password"));

    // Step 3: login and fetch -- empty.
    engine.login(&demo_login()).await.unwrap();
    assert!(store.is_logged_in());
    assert!(engine.fetch_todolists().await.unwrap().is_empty());

    // Step 4: add two todolists; the newest sits at the head.
    let home = engine.add_todolist("Home").await.unwrap();
    let work = engine.add_todolist("Work").await.unwrap();
    let ids: Vec<_> = store.todolists().iter().map(|tl| tl.id().to_string()).collect();
    assert_eq!(ids, [work.id.clone(), home.id.clone()]);
    assert!(store.tasks().bucket(&home.id).is_some());

    // Step 5: add a task, then patch only its status.
    let milk = engine.add_task(&home.id, "Milk").await.unwrap();
    let sent = engine
        .update_task(&home.id, &milk.id, TaskPatch::status(TaskStatus::Completed))
        .await
        .unwrap();
    assert_eq!(sent.title, "Milk");

    // The server kept the title because the full merged task was sent.
    let tasks = engine.fetch_tasks(&home.id).await.unwrap();
    assert_eq!(tasks[0].title, "Milk");
    assert_eq!(tasks[0].status, TaskStatus::Completed);

    // Step 6: rename, then a rejected rename leaves the title alone.
    engine.rename_todolist(&work.id, "Office").await.unwrap();
    let err = engine.rename_todolist(&work.id, "").await.unwrap_err();
    assert!(matches!(err, SyncError::Rejected { ref message, .. } if message == "Title is required"));
    let office = store.todolists().into_iter().find(|tl| tl.id() == work.id).unwrap();
    assert_eq!(office.todolist.title, "Office");
    assert_eq!(office.entity_status, RequestStatus::Failed);

    // Step 7: remove "Home"; its bucket goes in the same step.
    engine.remove_todolist(&home.id).await.unwrap();
    assert!(store.todolists().iter().all(|tl| tl.id() != home.id));
    assert!(store.tasks().bucket(&home.id).is_none());

    // Step 8: a fresh engine with the session picks everything up again.
    let other = self::engine(&base_url);
    assert!(other.initialize_app().await.unwrap());
    assert_eq!(other.store().todolists().len(), 1);
    assert!(other.store().tasks().bucket(&work.id).is_some());

    // Step 9: logout wipes both stores.
    engine.logout().await.unwrap();
    assert!(!store.is_logged_in());
    assert!(store.todolists().is_empty());
    assert!(store.tasks().is_empty());
    assert!(!store.is_busy());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn initialize_loads_todolists_and_tasks() {
    let base_url = start_server(true).await;

    let seeder = engine(&base_url);
    let groceries = seeder.add_todolist("Groceries").await.unwrap();
    seeder.add_task(&groceries.id, "Bread").await.unwrap();
    seeder.add_task(&groceries.id, "Eggs").await.unwrap();

    let engine = engine(&base_url);
    assert!(engine.initialize_app().await.unwrap());
    let titles: Vec<_> = engine
        .store()
        .tasks_of(&groceries.id)
        .into_iter()
        .map(|t| t.task.title)
        .collect();
    assert_eq!(titles, ["Eggs", "Bread"]);
    assert_eq!(engine.store().status(), RequestStatus::Succeeded);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let engine = engine(&format!("http://{addr}"));
    let err = engine.initialize_app().await.unwrap_err();
    assert!(matches!(err, SyncError::Network { .. }));
    assert!(engine.store().is_initialized());
    assert_eq!(engine.store().status(), RequestStatus::Failed);
    assert!(engine.store().error().is_some_and(|e| !e.is_empty()));
}
