// Remote store client
// Best-effort reads and deletes against a DevFlow server; failures degrade to empty / false

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::commands::common::now;
use crate::models::{Task, TaskStoreFile};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const TASKS_PATH: &str = "/tasks";

#[derive(Deserialize)]
struct RemoteTasksBody {
    tasks: Vec<Task>,
    #[serde(default)]
    lastUpdated: Option<String>,
}

#[derive(Deserialize)]
struct RemoteDeleteBody {
    #[serde(default)]
    success: bool,
}

#[derive(Clone, Debug)]
pub struct RemoteClient {
    client: Client,
}

impl RemoteClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("[Remote] Failed to build HTTP client ({}), using defaults", e);
                Client::new()
            });
        Self { client }
    }

    fn tasksUrl(serverUrl: &str) -> String {
        format!("{}{}", serverUrl.trim_end_matches('/'), TASKS_PATH)
    }

    /// `GET {serverUrl}/tasks`. Any transport error, non-2xx status or malformed body
    /// yields the empty store.
    pub async fn fetchAll(&self, serverUrl: &str) -> TaskStoreFile {
        match self.tryFetchAll(serverUrl).await {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!("[Remote] Fetch from {} failed: {}", serverUrl, e);
                TaskStoreFile::empty(now())
            }
        }
    }

    async fn tryFetchAll(&self, serverUrl: &str) -> Result<TaskStoreFile, String> {
        let response = self
            .client
            .get(Self::tasksUrl(serverUrl))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let body: RemoteTasksBody = response.json().await.map_err(|e| e.to_string())?;
        let mut file = TaskStoreFile::empty(body.lastUpdated.unwrap_or_else(now));
        file.tasks = body.tasks;
        Ok(file)
    }

    /// `DELETE {serverUrl}/tasks/{id}`; true only when the server reports success
    pub async fn deleteRemote(&self, serverUrl: &str, id: &str) -> bool {
        let url = format!("{}/{}", Self::tasksUrl(serverUrl), urlencoding::encode(id));

        let response = match self.client.delete(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("[Remote] Delete {} failed: {}", id, e);
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("[Remote] Delete {} returned HTTP {}", id, response.status());
            return false;
        }

        match response.json::<RemoteDeleteBody>().await {
            Ok(body) => body.success,
            Err(e) => {
                tracing::warn!("[Remote] Delete {} returned malformed body: {}", id, e);
                false
            }
        }
    }
}

impl Default for RemoteClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::task::addTask;
    use crate::server::serveRouter;
    use crate::storage::{Storage, loadTasks};
    use crate::models::Settings;
    use axum::{Router, routing::get};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn storage(dir: &TempDir) -> Arc<Storage> {
        Arc::new(Storage::new(dir.path().to_path_buf(), Settings::default()))
    }

    #[tokio::test]
    async fn fetch_all_reads_served_store() {
        let dir = TempDir::new().unwrap();
        let a = addTask(dir.path(), "Remote A", None).unwrap();
        addTask(dir.path(), "Remote B", Some("details")).unwrap();
        let url = spawn(serveRouter(storage(&dir))).await;

        let file = RemoteClient::default().fetchAll(&format!("{}/", url)).await;
        assert_eq!(file.tasks.len(), 2);
        assert_eq!(file.tasks[0].id, a.id);
        assert_eq!(file.tasks[1].description.as_deref(), Some("details"));
    }

    #[tokio::test]
    async fn delete_remote_reports_success_and_missing() {
        let dir = TempDir::new().unwrap();
        let a = addTask(dir.path(), "Doomed", None).unwrap();
        let url = spawn(serveRouter(storage(&dir))).await;
        let client = RemoteClient::default();

        assert!(client.deleteRemote(&url, &a.id).await);
        assert!(loadTasks(dir.path()).tasks.is_empty());
        assert!(!client.deleteRemote(&url, &a.id).await);
    }

    #[tokio::test]
    async fn unreachable_server_yields_empty_store() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RemoteClient::new(Duration::from_secs(1));
        let url = format!("http://{}", addr);
        assert!(client.fetchAll(&url).await.tasks.is_empty());
        assert!(!client.deleteRemote(&url, "abc").await);
    }

    #[tokio::test]
    async fn malformed_body_and_error_status_yield_empty_store() {
        let router = Router::new()
            .route("/bad/tasks", get(|| async { "not json" }))
            .route(
                "/down/tasks",
                get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "{\"tasks\":[]}") }),
            );
        let url = spawn(router).await;
        let client = RemoteClient::default();

        assert!(client.fetchAll(&format!("{}/bad", url)).await.tasks.is_empty());
        assert!(client.fetchAll(&format!("{}/down", url)).await.tasks.is_empty());
        assert!(!client.deleteRemote(&format!("{}/bad", url), "x").await);
    }

    #[tokio::test]
    async fn slow_server_is_cut_off_by_timeout() {
        let router = Router::new().route(
            "/tasks",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{\"tasks\":[]}"
            }),
        );
        let url = spawn(router).await;

        let started = std::time::Instant::now();
        let file = RemoteClient::new(Duration::from_millis(200)).fetchAll(&url).await;
        assert!(file.tasks.is_empty());
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
