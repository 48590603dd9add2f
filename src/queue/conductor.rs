//! Conductor REST client (`/tasks/poll/{taskType}`, `/tasks`).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use super::TaskQueue;
use crate::error::{Result, WorkerError};
use crate::schedule::types::{Task, TaskUpdate};

pub struct ConductorClient {
    client: Client,
    server_url: String,
    auth_token: Option<String>,
}

impl ConductorClient {
    pub fn new(client: Client, server_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            client,
            server_url: server_url.into().trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.header("X-Authorization", token),
            None => builder,
        }
    }

    async fn expect_success(what: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(WorkerError::Queue(format!("{} returned status {}: {}", what, status.as_u16(), body)))
    }
}

#[async_trait]
impl TaskQueue for ConductorClient {
    async fn poll(&self, task_type: &str, worker_id: &str, domain: Option<&str>) -> Result<Option<Task>> {
        let mut query = vec![("workerid", worker_id)];
        if let Some(domain) = domain {
            query.push(("domain", domain));
        }

        let builder = self
            .client
            .get(format!("{}/tasks/poll/{}", self.server_url, task_type))
            .query(&query);
        let response = self.authorized(builder).send().await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let response = Self::expect_success("poll", response).await?;

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let task: Task = serde_json::from_str(&body)?;
        debug!("Polled {} task {}", task_type, task.task_id);
        Ok(Some(task))
    }

    async fn update(&self, update: &TaskUpdate) -> Result<()> {
        let builder = self
            .client
            .post(format!("{}/tasks", self.server_url))
            .json(update);
        let response = self.authorized(builder).send().await?;
        Self::expect_success("update", response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::TaskStatus;
    use axum::{
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Map, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Seen {
        polls: Arc<Mutex<Vec<(String, HashMap<String, String>, Option<String>)>>>,
        updates: Arc<Mutex<Vec<Value>>>,
    }

    async fn poll(
        State(seen): State<Seen>,
        Path(task_type): Path<String>,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> axum::response::Response {
        use axum::response::IntoResponse;
        let auth = headers
            .get("X-Authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.polls.lock().unwrap().push((task_type.clone(), params, auth));
        if task_type == "myTask" {
            Json(json!({
                "taskId": "t-1",
                "workflowInstanceId": "wf-1",
                "taskType": "myTask",
                "taskDefName": "myTask",
                "status": "IN_PROGRESS",
                "inputData": {"name": "conductor"},
                "pollCount": 1,
                "callbackAfterSeconds": 0
            }))
            .into_response()
        } else {
            StatusCode::NO_CONTENT.into_response()
        }
    }

    async fn update(State(seen): State<Seen>, Json(body): Json<Value>) -> &'static str {
        seen.updates.lock().unwrap().push(body);
        "t-1"
    }

    async fn serve(seen: Seen) -> String {
        let app = Router::new()
            .route("/api/tasks/poll/:task_type", get(poll))
            .route("/api/tasks", post(update))
            .with_state(seen);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn http_client() -> Client {
        crate::utils::http::build_client(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_poll_task() {
        let seen = Seen::default();
        let server = serve(seen.clone()).await;
        let client = ConductorClient::new(http_client(), format!("{}/", server), Some("secret".into()));

        let task = client.poll("myTask", "worker-1", Some("blue")).await.unwrap().unwrap();
        assert_eq!(task.task_id, "t-1");
        assert_eq!(task.workflow_instance_id, "wf-1");
        assert_eq!(task.definition_name(), "myTask");
        assert_eq!(task.input_data.get("name"), Some(&json!("conductor")));

        let polls = seen.polls.lock().unwrap();
        assert_eq!(polls[0].1.get("workerid").map(String::as_str), Some("worker-1"));
        assert_eq!(polls[0].1.get("domain").map(String::as_str), Some("blue"));
        assert_eq!(polls[0].2.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn test_no_content_means_no_task() {
        let seen = Seen::default();
        let client = ConductorClient::new(http_client(), serve(seen.clone()).await, None);

        assert!(client.poll("piiTask", "worker-1", None).await.unwrap().is_none());
        let polls = seen.polls.lock().unwrap();
        assert!(!polls[0].1.contains_key("domain"));
        assert_eq!(polls[0].2, None);
    }

    #[tokio::test]
    async fn test_update_is_camel_case() {
        let seen = Seen::default();
        let client = ConductorClient::new(http_client(), serve(seen.clone()).await, None);

        let mut output = Map::new();
        output.insert("result".into(), json!("hello, conductor"));
        client
            .update(&TaskUpdate {
                task_id: "t-1".into(),
                workflow_instance_id: "wf-1".into(),
                worker_id: "worker-1".into(),
                status: TaskStatus::Completed,
                output_data: output,
                reason_for_incompletion: None,
                logs: vec![],
            })
            .await
            .unwrap();

        let updates = seen.updates.lock().unwrap();
        assert_eq!(
            updates[0],
            json!({
                "taskId": "t-1",
                "workflowInstanceId": "wf-1",
                "workerId": "worker-1",
                "status": "COMPLETED",
                "outputData": {"result": "hello, conductor"}
            })
        );
    }

    #[tokio::test]
    async fn test_server_error_is_a_queue_error() {
        let app = Router::new().route(
            "/tasks/poll/:task_type",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = ConductorClient::new(http_client(), format!("http://{}", addr), None);
        match client.poll("myTask", "worker-1", None).await {
            Err(WorkerError::Queue(message)) => assert_eq!(message, "poll returned status 500: boom"),
            other => panic!("unexpected: {:?}", other.map(|t| t.map(|t| t.task_id))),
        }
    }
}
