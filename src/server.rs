// HTTP server: health check, remote store contract, MCP streamable HTTP service

use axum::{
    Json, Router,
    extract::{Path as AxumPath, State},
    http::StatusCode,
    routing::{delete, get},
};
use parking_lot::RwLock;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::commands::task::deleteTask;
use crate::mcp::DevFlowServer;
use crate::models::TaskStoreFile;
use crate::storage::{StorageState, loadTasks};

pub const DEFAULT_PORT: u16 = 3000;

// ============================================
// ROUTES
// ============================================

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "devflow-mcp" }))
}

async fn listTasks(State(storage): State<StorageState>) -> Json<TaskStoreFile> {
    Json(loadTasks(storage.projectDir()))
}

async fn removeTask(
    State(storage): State<StorageState>,
    AxumPath(id): AxumPath<String>,
) -> (StatusCode, Json<Value>) {
    match deleteTask(storage.projectDir(), &id) {
        Ok(removed) => (StatusCode::OK, Json(json!({ "success": removed }))),
        Err(e) => {
            tracing::error!("[HTTP] Delete {} failed: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e })),
            )
        }
    }
}

/// Full router; MCP sessions are cancelled with `ct`
pub fn router(storage: StorageState, ct: CancellationToken) -> Router {
    let mcpStorage = storage.clone();
    let service = StreamableHttpService::new(
        move || Ok(DevFlowServer::new(mcpStorage.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            cancellation_token: ct,
            ..Default::default()
        },
    );

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/tasks", get(listTasks))
        .route("/tasks/{id}", delete(removeTask))
        .with_state(storage)
        .fallback_service(service)
}

pub fn serveRouter(storage: StorageState) -> Router {
    router(storage, CancellationToken::new())
}

// ============================================
// SERVER LIFECYCLE
// ============================================

pub struct HttpServerManager {
    is_running: Arc<RwLock<bool>>,
    cancel_token: Arc<RwLock<Option<CancellationToken>>>,
}

impl Default for HttpServerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpServerManager {
    pub fn new() -> Self {
        Self {
            is_running: Arc::new(RwLock::new(false)),
            cancel_token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn is_running(&self) -> bool {
        *self.is_running.read()
    }

    /// Bind `bindAddress` and serve in the background; returns the bound address
    pub async fn start(&self, storage: StorageState, bindAddress: &str) -> Result<SocketAddr, String> {
        if self.is_running() {
            return Err("Server is already running".to_string());
        }

        tracing::info!("[HTTP] Starting server on {}...", bindAddress);

        let listener = tokio::net::TcpListener::bind(bindAddress)
            .await
            .map_err(|e| format!("Failed to bind {}: {}", bindAddress, e))?;
        let addr = listener.local_addr().map_err(|e| e.to_string())?;

        let ct = CancellationToken::new();
        *self.cancel_token.write() = Some(ct.clone());

        let app = router(storage, ct.child_token());
        let is_running = self.is_running.clone();
        *is_running.write() = true;

        tokio::spawn(async move {
            tracing::info!("[HTTP] Server started on {}", addr);
            tracing::info!("[HTTP] Health check: http://{}/health", addr);

            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    ct.cancelled().await;
                })
                .await
            {
                tracing::error!("[HTTP] Server error: {}", e);
            }

            *is_running.write() = false;
            tracing::info!("[HTTP] Server stopped");
        });

        Ok(addr)
    }

    pub fn stop(&self) {
        tracing::info!("[HTTP] Stopping server...");
        if let Some(ct) = self.cancel_token.write().take() {
            ct.cancel();
        }
    }
}
