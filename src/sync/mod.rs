// Local/remote synchronization: reconciliation, change notification, delete routing

pub mod reconcile;
pub mod service;

pub use reconcile::{MergedTask, Reconciler, TaskOrigin, fingerprint, reconcile};
pub use service::SyncService;

use std::path::Path;

use crate::commands::task::deleteTask;
use crate::remote::RemoteClient;
use crate::storage::loadTasks;

/// Load the local store and, when a server is configured, the remote one, then merge
pub async fn loadMerged(projectDir: &Path, serverUrl: Option<&str>, client: &RemoteClient) -> Vec<MergedTask> {
    let local = loadTasks(projectDir).tasks;
    let remote = match serverUrl {
        Some(url) => Some(client.fetchAll(url).await.tasks),
        None => None,
    };
    reconcile(&local, remote.as_deref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Local,
    Remote,
    NotFound,
}

/// Delete locally; fall back to the remote store when the id is not local
pub async fn removeTask(
    projectDir: &Path,
    serverUrl: Option<&str>,
    client: &RemoteClient,
    id: &str,
) -> Result<Removal, String> {
    if deleteTask(projectDir, id)? {
        return Ok(Removal::Local);
    }

    if let Some(url) = serverUrl {
        if client.deleteRemote(url, id).await {
            tracing::info!("[Sync] Deleted remote task {}", id);
            return Ok(Removal::Remote);
        }
    }

    Ok(Removal::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::task::addTask;
    use crate::models::Settings;
    use crate::server::serveRouter;
    use crate::storage::Storage;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn serve(dir: &TempDir) -> String {
        let storage = Arc::new(Storage::new(dir.path().to_path_buf(), Settings::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, serveRouter(storage)).await.unwrap();
        });
        url
    }

    #[tokio::test]
    async fn remove_prefers_local_then_remote() {
        let localDir = TempDir::new().unwrap();
        let remoteDir = TempDir::new().unwrap();
        let local = addTask(localDir.path(), "local", None).unwrap();
        let remote = addTask(remoteDir.path(), "remote", None).unwrap();
        let url = serve(&remoteDir).await;
        let client = RemoteClient::default();

        let merged = loadMerged(localDir.path(), Some(&url), &client).await;
        assert_eq!(merged.len(), 2);

        assert_eq!(
            removeTask(localDir.path(), Some(&url), &client, &local.id).await.unwrap(),
            Removal::Local
        );
        assert_eq!(
            removeTask(localDir.path(), Some(&url), &client, &remote.id).await.unwrap(),
            Removal::Remote
        );
        assert_eq!(
            removeTask(localDir.path(), Some(&url), &client, "missing").await.unwrap(),
            Removal::NotFound
        );
        assert!(loadMerged(localDir.path(), Some(&url), &client).await.is_empty());
    }

    #[tokio::test]
    async fn remove_without_server_is_local_only() {
        let dir = TempDir::new().unwrap();
        let client = RemoteClient::default();
        assert_eq!(
            removeTask(dir.path(), None, &client, "abc").await.unwrap(),
            Removal::NotFound
        );
    }
}
