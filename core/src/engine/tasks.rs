use crate::client::ApiClient;
use crate::error::SyncError;
use crate::event::SyncEvent;
use crate::status::RequestStatus;
use crate::store::Action;
use crate::tasks::{merge_patch, TaskPatch};
use crate::transport::Transport;
use crate::types::{Envelope, Rejection, Task, UpdateTaskModel};

use super::SyncEngine;

impl<T: Transport> SyncEngine<T> {
    /// Replace one todolist's task bucket with the server's tasks.
    pub async fn fetch_tasks(&self, todolist_id: &str) -> Result<Vec<Task>, SyncError> {
        let _op = self.store.begin_operation();
        tracing::debug!(%todolist_id, "fetching tasks");
        self.set_status(RequestStatus::Loading);

        let outcome = self
            .call(Ok(self.client.build_get_tasks(todolist_id)), ApiClient::parse_get_tasks)
            .await
            .map(|res| match res.error {
                Some(message) => Envelope::Rejected(Rejection {
                    result_code: 1,
                    messages: vec![message],
                }),
                None => Envelope::Accepted(res.items),
            });
        let tasks = self.settle(outcome, |_| {})?;
        self.store.dispatch(SyncEvent::TasksFetched {
            todolist_id: todolist_id.to_string(),
            tasks: tasks.clone(),
        });
        Ok(tasks)
    }

    /// Create a task; on success it is inserted at the head of its bucket.
    pub async fn add_task(&self, todolist_id: &str, title: &str) -> Result<Task, SyncError> {
        let _op = self.store.begin_operation();
        tracing::debug!(%todolist_id, %title, "adding task");
        self.set_status(RequestStatus::Loading);

        let outcome = self
            .call(self.client.build_create_task(todolist_id, title), ApiClient::parse_create_task)
            .await;
        let task = self.settle(outcome, |_| {})?;
        self.store.dispatch(SyncEvent::TaskAdded(task.clone()));
        Ok(task)
    }

    pub async fn remove_task(&self, todolist_id: &str, task_id: &str) -> Result<(String, String), SyncError> {
        let _op = self.store.begin_operation();
        tracing::debug!(%todolist_id, %task_id, "removing task");
        self.set_status(RequestStatus::Loading);
        self.set_task_status(todolist_id, task_id, RequestStatus::Loading);

        let outcome = self
            .call(Ok(self.client.build_delete_task(todolist_id, task_id)), ApiClient::parse_delete_task)
            .await;
        self.settle(outcome, |rejected| {
            if let Some(status) = self.failed_entity_status(rejected) {
                self.set_task_status(todolist_id, task_id, status);
            }
        })?;
        self.set_task_status(todolist_id, task_id, RequestStatus::Succeeded);
        self.store.dispatch(SyncEvent::TaskRemoved {
            todolist_id: todolist_id.to_string(),
            task_id: task_id.to_string(),
        });
        Ok((todolist_id.to_string(), task_id.to_string()))
    }

    /// Apply `patch` to a stored task.
    ///
    /// The full body sent to the server is the stored task with `patch`
    /// laid over it. Returns that body on success.
    ///
    /// # Errors
    ///
    /// [`SyncError::TaskNotFound`] without any request when the task is not
    /// in the store; otherwise the usual rejected/network errors.
    pub async fn update_task(
        &self,
        todolist_id: &str,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<UpdateTaskModel, SyncError> {
        let current = self
            .store
            .select(|s| s.tasks.get(todolist_id, task_id).map(|t| t.task.clone()));
        let Some(current) = current else {
            tracing::warn!(%todolist_id, %task_id, "task not found in store");
            return Err(SyncError::TaskNotFound {
                todolist_id: todolist_id.to_string(),
                task_id: task_id.to_string(),
            });
        };
        let model = merge_patch(&current, &patch);

        let _op = self.store.begin_operation();
        tracing::debug!(%todolist_id, %task_id, "updating task");
        self.set_status(RequestStatus::Loading);
        self.set_task_status(todolist_id, task_id, RequestStatus::Loading);

        let outcome = self
            .call(
                self.client.build_update_task(todolist_id, task_id, &model),
                ApiClient::parse_update_task,
            )
            .await;
        self.settle(outcome, |rejected| {
            if let Some(status) = self.failed_entity_status(rejected) {
                self.set_task_status(todolist_id, task_id, status);
            }
        })?;
        self.set_task_status(todolist_id, task_id, RequestStatus::Succeeded);
        self.store.dispatch(SyncEvent::TaskUpdated {
            todolist_id: todolist_id.to_string(),
            task_id: task_id.to_string(),
            patch,
        });
        Ok(model)
    }

    fn set_task_status(&self, todolist_id: &str, task_id: &str, status: RequestStatus) {
        self.store.dispatch(Action::SetTaskEntityStatus {
            todolist_id: todolist_id.to_string(),
            task_id: task_id.to_string(),
            status,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde_json::json;

    use crate::client::ApiClient;
    use crate::engine::testing::ScriptedTransport;
    use crate::engine::{EngineOptions, SyncEngine};
    use crate::error::SyncError;
    use crate::event::SyncEvent;
    use crate::fixtures::{task, todolist};
    use crate::http::{HttpRequest, HttpResponse};
    use crate::status::RequestStatus;
    use crate::store::Store;
    use crate::tasks::TaskPatch;
    use crate::transport::{Transport, TransportError};
    use crate::types::TaskStatus;

    fn task_json(id: &str, todolist_id: &str, title: &str) -> serde_json::Value {
        json!({
            "id": id, "title": title, "description": null, "todoListId": todolist_id,
            "order": 0, "status": 0, "priority": 1, "startDate": null, "deadline": null,
            "addedDate": "2024-03-01T09:30:00"
        })
    }

    /// Engine whose store holds todolist "1" with task "a" titled "Milk".
    fn seeded(transport: ScriptedTransport) -> SyncEngine<ScriptedTransport> {
        let store = Store::new();
        store.dispatch(SyncEvent::TodolistsFetched(vec![todolist("1", "Home")]));
        let mut milk = task("a", "1", "Milk");
        milk.description = Some("2 litres".to_string());
        store.dispatch(SyncEvent::TaskAdded(milk));
        SyncEngine::new(ApiClient::new("http://api.test"), transport, store)
    }

    #[tokio::test]
    async fn fetch_tasks_replaces_bucket() {
        let transport = ScriptedTransport::default().reply_json(json!({
            "items": [task_json("x", "1", "X"), task_json("y", "1", "Y")],
            "totalCount": 2,
            "error": null
        }));
        let engine = seeded(transport);

        let tasks = engine.fetch_tasks("1").await.unwrap();
        assert_eq!(tasks.len(), 2);

        let ids: Vec<_> = engine.store().tasks_of("1").iter().map(|t| t.id().to_string()).collect();
        assert_eq!(ids, ["x", "y"]);
    }

    #[tokio::test]
    async fn fetch_tasks_error_field_is_a_rejection() {
        let transport = ScriptedTransport::default().reply_json(json!({
            "items": [], "totalCount": 0, "error": "Todolist not found"
        }));
        let engine = seeded(transport);

        let err = engine.fetch_tasks("1").await.unwrap_err();
        assert!(matches!(err, SyncError::Rejected { .. }));
        assert_eq!(engine.store().tasks_of("1").len(), 1);
        assert_eq!(engine.store().error().as_deref(), Some("Todolist not found"));
    }

    #[tokio::test]
    async fn add_task_prepends_into_bucket() {
        let transport = ScriptedTransport::default().accept(json!({"item": task_json("b", "1", "Bread")}));
        let engine = seeded(transport);

        let added = engine.add_task("1", "Bread").await.unwrap();
        assert_eq!(added.title, "Bread");
        let tasks = engine.store().tasks_of("1");
        assert_eq!(tasks[0].id(), "b");
        assert_eq!(tasks[1].id(), "a");
        assert_eq!(engine.transport().sent()[0].path, "http://api.test/todo-lists/1/tasks");
    }

    #[tokio::test]
    async fn remove_task_success() {
        let engine = seeded(ScriptedTransport::default().accept(json!({})));
        engine.remove_task("1", "a").await.unwrap();
        assert!(engine.store().tasks_of("1").is_empty());
    }

    #[tokio::test]
    async fn remove_task_rejection_marks_row_failed() {
        let engine = seeded(ScriptedTransport::default().reject(&["Task is locked"]));
        engine.remove_task("1", "a").await.unwrap_err();
        let tasks = engine.store().tasks_of("1");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].entity_status, RequestStatus::Failed);
    }

    #[tokio::test]
    async fn update_sends_patch_merged_onto_stored_task() {
        let transport = ScriptedTransport::default().accept(json!({"item": task_json("a", "1", "Milk")}));
        let engine = seeded(transport);

        let model = engine
            .update_task("1", "a", TaskPatch::status(TaskStatus::Completed))
            .await
            .unwrap();
        assert_eq!(model.title, "Milk");
        assert_eq!(model.status, TaskStatus::Completed);

        let sent = engine.transport().sent();
        let body: serde_json::Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Milk");
        assert_eq!(body["description"], "2 litres");
        assert_eq!(body["status"], 2);
        assert_eq!(sent[0].path, "http://api.test/todo-lists/1/tasks/a");

        let stored = &engine.store().tasks_of("1")[0];
        assert_eq!(stored.task.status, TaskStatus::Completed);
        assert_eq!(stored.task.title, "Milk");
        assert_eq!(stored.entity_status, RequestStatus::Succeeded);
    }

    #[tokio::test]
    async fn update_unknown_task_makes_no_request() {
        let engine = seeded(ScriptedTransport::default());
        let err = engine
            .update_task("1", "ghost", TaskPatch::title("x"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SyncError::TaskNotFound {
                todolist_id: "1".to_string(),
                task_id: "ghost".to_string(),
            }
        );
        assert!(engine.transport().sent().is_empty());
        assert_eq!(engine.store().status(), RequestStatus::Idle);
        assert!(engine.store().error().is_none());
    }

    #[tokio::test]
    async fn update_rejection_leaves_task_untouched() {
        let engine = seeded(ScriptedTransport::default().reject(&["Title too long"]));
        engine
            .update_task("1", "a", TaskPatch::title("x".repeat(200)))
            .await
            .unwrap_err();
        let stored = &engine.store().tasks_of("1")[0];
        assert_eq!(stored.task.title, "Milk");
        assert_eq!(stored.entity_status, RequestStatus::Failed);
        assert_eq!(engine.store().error().as_deref(), Some("Title too long"));
    }

    #[tokio::test]
    async fn update_network_failure_leaves_row_loading() {
        let engine = seeded(ScriptedTransport::default().fail("reset by peer"));
        engine
            .update_task("1", "a", TaskPatch::status(TaskStatus::Completed))
            .await
            .unwrap_err();
        let stored = &engine.store().tasks_of("1")[0];
        assert_eq!(stored.task.status, TaskStatus::New);
        assert_eq!(stored.entity_status, RequestStatus::Loading);
        assert_eq!(engine.store().status(), RequestStatus::Failed);
    }

    #[tokio::test]
    async fn update_network_failure_can_mark_row_failed() {
        let engine = seeded(ScriptedTransport::default().fail("timeout")).with_options(EngineOptions {
            fail_entity_on_network_error: true,
            ..EngineOptions::default()
        });
        engine
            .update_task("1", "a", TaskPatch::status(TaskStatus::Completed))
            .await
            .unwrap_err();
        let stored = &engine.store().tasks_of("1")[0];
        assert_eq!(stored.task.status, TaskStatus::New);
        assert_eq!(stored.entity_status, RequestStatus::Failed);
    }

    #[tokio::test]
    async fn remove_task_network_failure_can_mark_row_failed() {
        let engine = seeded(ScriptedTransport::default().fail("timeout")).with_options(EngineOptions {
            fail_entity_on_network_error: true,
            ..EngineOptions::default()
        });
        engine.remove_task("1", "a").await.unwrap_err();
        let tasks = engine.store().tasks_of("1");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].entity_status, RequestStatus::Failed);
    }

    /// Answers each path after its own delay and notes how many operations
    /// were in flight when the answer went out.
    #[derive(Debug)]
    struct StaggeredTransport {
        store: Store,
        routes: Vec<(&'static str, u64, serde_json::Value)>,
        answered: Mutex<Vec<(String, usize)>>,
    }

    impl Transport for StaggeredTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let (delay, body) = self
                .routes
                .iter()
                .find(|(suffix, ..)| request.path.ends_with(suffix))
                .map(|(_, delay, body)| (*delay, body.to_string()))
                .ok_or_else(|| TransportError::Request(format!("no route for {}", request.path)))?;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.answered.lock().push((request.path, self.store.in_flight()));
            Ok(HttpResponse::ok_json(body))
        }
    }

    #[tokio::test]
    async fn concurrent_updates_settle_independently() {
        let store = Store::new();
        store.dispatch(SyncEvent::TodolistsFetched(vec![todolist("1", "Home")]));
        store.dispatch(SyncEvent::TaskAdded(task("a", "1", "Milk")));
        store.dispatch(SyncEvent::TaskAdded(task("b", "1", "Bread")));

        let transport = StaggeredTransport {
            store: store.clone(),
            routes: vec![
                (
                    "/tasks/a",
                    80,
                    json!({"resultCode": 0, "messages": [], "data": {"item": task_json("a", "1", "Milk")}}),
                ),
                (
                    "/tasks/b",
                    10,
                    json!({"resultCode": 1, "messages": ["Title is too long"], "data": {}}),
                ),
            ],
            answered: Mutex::new(Vec::new()),
        };
        let engine = SyncEngine::new(ApiClient::new("http://api.test"), transport, store.clone());

        let (slow, fast) = tokio::join!(
            engine.update_task("1", "a", TaskPatch::status(TaskStatus::Completed)),
            engine.update_task("1", "b", TaskPatch::title("x".repeat(200))),
        );
        assert!(slow.is_ok());
        assert!(matches!(fast, Err(SyncError::Rejected { .. })));

        // Both were pending when the fast one answered; only the slow one
        // was left by the time it answered.
        let answered = engine.transport().answered.lock().clone();
        assert_eq!(
            answered,
            [
                ("http://api.test/todo-lists/1/tasks/b".to_string(), 2),
                ("http://api.test/todo-lists/1/tasks/a".to_string(), 1),
            ]
        );

        let state = store.snapshot();
        let a = state.tasks.get("1", "a").unwrap();
        assert_eq!(a.task.status, TaskStatus::Completed);
        assert_eq!(a.entity_status, RequestStatus::Succeeded);
        let b = state.tasks.get("1", "b").unwrap();
        assert_eq!(b.task.title, "Bread");
        assert_eq!(b.entity_status, RequestStatus::Failed);

        // Global status is whatever the later call wrote; the error stays.
        assert_eq!(store.status(), RequestStatus::Succeeded);
        assert_eq!(store.error().as_deref(), Some("Title is too long"));
        assert_eq!(store.in_flight(), 0);
        assert!(!store.is_busy());
    }
}
