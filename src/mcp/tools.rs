// MCP Tools implementation using official rmcp SDK

use rmcp::{
    ErrorData as McpError,
    model::*,
    tool, tool_router,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
};
use serde::Deserialize;
use schemars::JsonSchema;

use crate::storage::StorageState;
use crate::mcp::api;

const INSTRUCTIONS: &str = "DevFlow is a task manager for AI-driven development. \
Use these tools to track your work:\n\
- get_all_tasks() at the start of every session\n\
- mark_task_started(task_id) when you begin working\n\
- add_new_task(title) when you discover new work\n\
- mark_task_complete(task_id) when a task is 100% done\n\
- snooze_a_task(task_id, date) if you can't finish now\n\
- remove_task(task_id) only for duplicates or invalid tasks";

/// DevFlow MCP Server - exposes the project's task store as tools
#[derive(Clone)]
pub struct DevFlowServer {
    pub storage: StorageState,
    tool_router: ToolRouter<Self>,
}

impl DevFlowServer {
    pub fn new(storage: StorageState) -> Self {
        Self {
            storage,
            tool_router: Self::tool_router(),
        }
    }
}

// Implement ServerHandler - delegates tool calls to the tool_router
impl rmcp::handler::server::ServerHandler for DevFlowServer {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        let mut info = rmcp::model::ServerInfo::default();
        info.instructions = Some(INSTRUCTIONS.into());
        info
    }

    fn initialize(
        &self,
        _request: rmcp::model::InitializeRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::InitializeResult, McpError>> + Send + '_ {
        async move {
            tracing::info!("[MCP] Initialize called");
            let mut result = rmcp::model::InitializeResult::default();
            result.capabilities.tools = Some(rmcp::model::ToolsCapability {
                list_changed: Some(false),
            });
            result.server_info.name = "devflow".into();
            result.server_info.version = env!("CARGO_PKG_VERSION").into();
            result.instructions = Some(INSTRUCTIONS.into());
            Ok(result)
        }
    }

    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_ {
        async move {
            let tools = self.tool_router.list_all();
            tracing::debug!("[MCP] list_tools called, found {} tools", tools.len());
            Ok(rmcp::model::ListToolsResult {
                tools,
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: rmcp::model::CallToolRequestParam,
        context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            tracing::info!("[MCP] call_tool {}", request.name);
            let tool_context = rmcp::handler::server::tool::ToolCallContext::new(self, request, context);
            self.tool_router.call(tool_context).await
        }
    }
}

// ============================================
// Tool Input Types
// ============================================

#[derive(Deserialize, JsonSchema)]
pub struct StatusFilterInput {
    /// pending, in_progress, done or snoozed; omit for all tasks
    pub status: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct AddTaskInput {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct TaskIdInput {
    pub task_id: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct SnoozeInput {
    pub task_id: String,
    /// Target date, YYYY-MM-DD
    pub date: String,
}

fn text(message: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(message)])
}

// ============================================
// Tool Implementations
// ============================================

#[tool_router]
impl DevFlowServer {
    #[tool(description = "Get all tasks from the workspace. Optionally filter by status: pending, in_progress, done, snoozed.")]
    async fn get_all_tasks(&self, input: Parameters<StatusFilterInput>) -> Result<CallToolResult, McpError> {
        let json = api::get_all_tasks(&self.storage, input.0.status.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(text(json))
    }

    #[tool(description = "Add a new task to the task list. Use when you discover new work that needs to be done.")]
    async fn add_new_task(&self, input: Parameters<AddTaskInput>) -> Result<CallToolResult, McpError> {
        let message = api::add_new_task(&self.storage, &input.0.title, input.0.description.as_deref())
            .map_err(|e| McpError::invalid_params(e, None))?;
        Ok(text(message))
    }

    #[tool(description = "Mark a task as in progress. Use when you begin working on a task.")]
    async fn mark_task_started(&self, input: Parameters<TaskIdInput>) -> Result<CallToolResult, McpError> {
        let message = api::mark_task_started(&self.storage, &input.0.task_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(text(message))
    }

    #[tool(description = "Mark a task as 100% done. Only use when the task is fully completed.")]
    async fn mark_task_complete(&self, input: Parameters<TaskIdInput>) -> Result<CallToolResult, McpError> {
        let message = api::mark_task_complete(&self.storage, &input.0.task_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(text(message))
    }

    #[tool(description = "Postpone a task to a future date (YYYY-MM-DD). Use when a task cannot be finished now.")]
    async fn snooze_a_task(&self, input: Parameters<SnoozeInput>) -> Result<CallToolResult, McpError> {
        let message = api::snooze_a_task(&self.storage, &input.0.task_id, &input.0.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(text(message))
    }

    #[tool(description = "Permanently delete a task. Use only for duplicate or invalid tasks.")]
    async fn remove_task(&self, input: Parameters<TaskIdInput>) -> Result<CallToolResult, McpError> {
        let message = api::remove_task(&self.storage, &input.0.task_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(text(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Settings;
    use crate::storage::{Storage, loadTasks};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn server(dir: &TempDir) -> DevFlowServer {
        DevFlowServer::new(Arc::new(Storage::new(dir.path().to_path_buf(), Settings::default())))
    }

    fn body(result: &CallToolResult) -> String {
        serde_json::to_string(result).unwrap()
    }

    #[test]
    fn router_lists_all_six_tools() {
        let dir = TempDir::new().unwrap();
        let mut names: Vec<String> = server(&dir)
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "add_new_task",
                "get_all_tasks",
                "mark_task_complete",
                "mark_task_started",
                "remove_task",
                "snooze_a_task",
            ]
        );
    }

    #[tokio::test]
    async fn tools_drive_the_store() {
        let dir = TempDir::new().unwrap();
        let s = server(&dir);

        let added = s
            .add_new_task(Parameters(AddTaskInput { title: "Review PR".into(), description: None }))
            .await
            .unwrap();
        assert!(body(&added).contains("Task added"));

        let id = loadTasks(dir.path()).tasks[0].id.clone();
        let done = s
            .mark_task_complete(Parameters(TaskIdInput { task_id: id.clone() }))
            .await
            .unwrap();
        assert!(body(&done).contains("Task completed"));

        let missing = s
            .mark_task_started(Parameters(TaskIdInput { task_id: "nope".into() }))
            .await
            .unwrap();
        assert!(body(&missing).contains("Task not found: nope"));

        let listing = s
            .get_all_tasks(Parameters(StatusFilterInput { status: Some("done".into()) }))
            .await
            .unwrap();
        assert!(body(&listing).contains(&id));

        assert!(
            s.add_new_task(Parameters(AddTaskInput { title: "".into(), description: None }))
                .await
                .is_err()
        );
    }
}
