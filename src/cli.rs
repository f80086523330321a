// Command line surface: one-shot store commands plus the long-running servers

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::commands::task::{
    TaskFilter, addTask, completeTask, filterTasks, parseDay, snoozeTask, startTask,
};
use crate::models::{SettingsOverride, Task, TaskStatus};
use crate::remote::RemoteClient;
use crate::server::{DEFAULT_PORT, HttpServerManager};
use crate::storage::{StorageState, initStorage, saveGlobalConfig};
use crate::sync::{MergedTask, Removal, SyncService, loadMerged, removeTask};

#[derive(Parser, Debug)]
#[command(name = "devflow", version, about = "Task tracking for a project's .tasks.json")]
pub struct Cli {
    /// Project directory holding .tasks.json
    #[arg(long, short, env = "WORK_DIR", default_value = ".", global = true)]
    pub dir: PathBuf,

    /// DevFlow server to merge remote tasks from (empty disables)
    #[arg(long, env = "DEVFLOW_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Seconds between reconciliation polls
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Date filters match non-snoozed tasks by creation day only
    #[arg(long, global = true)]
    pub strict_dates: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks
    List {
        #[arg(long)]
        status: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Include tasks from the configured server
        #[arg(long)]
        merged: bool,
        #[arg(long)]
        json: bool,
    },
    /// Add a pending task
    Add {
        title: String,
        #[arg(long, short = 'm')]
        description: Option<String>,
    },
    /// Mark a task as in progress
    Start { id: String },
    /// Mark a task as done
    Complete { id: String },
    /// Snooze a task until DATE
    Snooze { id: String, date: String },
    /// Delete a task (local first, then the configured server)
    Remove { id: String },
    /// Print the merged list whenever it changes
    Watch,
    /// Serve the HTTP endpoints and MCP over streamable HTTP
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Serve MCP over stdio
    Mcp,
    /// Show the effective settings
    Config {
        /// Persist them to ~/.devflow/config.json
        #[arg(long)]
        save: bool,
    },
}

impl Command {
    /// Long-running commands log at info by default
    pub fn isLongRunning(&self) -> bool {
        matches!(self, Command::Watch | Command::Serve { .. } | Command::Mcp)
    }
}

impl Cli {
    pub fn settingsOverride(&self) -> SettingsOverride {
        SettingsOverride {
            serverUrl: self.server_url.clone(),
            pollIntervalSecs: self.poll_interval,
            requestTimeoutSecs: None,
            strictDateFilter: self.strict_dates.then_some(true),
        }
    }
}

fn formatTask(task: &Task) -> String {
    let mut line = format!("[{}] {:<11} {}", task.id, task.status.name(), task.title);
    if let Some(until) = task.snoozedUntil.as_deref().filter(|_| task.status == TaskStatus::Snoozed) {
        line.push_str(&format!(" (until {})", until));
    }
    line
}

fn formatMerged(merged: &MergedTask) -> String {
    match merged.origin {
        crate::sync::TaskOrigin::Local => formatTask(&merged.task),
        crate::sync::TaskOrigin::Remote => format!("{} (remote)", formatTask(&merged.task)),
    }
}

fn printJson<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn notFound(id: &str) -> String {
    format!("Task not found: {}", id)
}

async fn waitForShutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// The project directory must already exist, except for `serve` which creates it
fn checkProjectDir(dir: &Path, create: bool) -> Result<(), String> {
    if create {
        fs::create_dir_all(dir).map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
    }
    if !dir.exists() {
        return Err(format!("Directory does not exist: {}", dir.display()));
    }
    if !dir.is_dir() {
        return Err(format!("Path is not a directory: {}", dir.display()));
    }
    Ok(())
}

pub async fn execute(cli: Cli) -> Result<(), String> {
    checkProjectDir(&cli.dir, matches!(cli.command, Command::Serve { .. }))?;
    let storage: StorageState = initStorage(cli.dir.clone(), &cli.settingsOverride());
    let settings = storage.settings.read().clone();
    let dir = storage.projectDir().to_path_buf();
    let client = RemoteClient::new(Duration::from_secs(settings.requestTimeoutSecs));

    match cli.command {
        Command::List { status, date, merged, json } => {
            let status = match status.as_deref() {
                Some(s) => Some(TaskStatus::fromName(s).ok_or_else(|| format!("Unknown status: {}", s))?),
                None => None,
            };
            let date = match date.as_deref() {
                Some(d) => Some(parseDay(d).ok_or_else(|| format!("Invalid date: {}", d))?),
                None => None,
            };
            let filter = TaskFilter {
                status,
                date,
                strictDate: settings.strictDateFilter,
            };

            if merged {
                let tasks: Vec<MergedTask> = loadMerged(&dir, settings.serverUrl.as_deref(), &client)
                    .await
                    .into_iter()
                    .filter(|m| filter.matches(&m.task))
                    .collect();
                if json {
                    return printJson(&tasks);
                }
                tasks.iter().for_each(|m| println!("{}", formatMerged(m)));
            } else {
                let tasks = filterTasks(&dir, &filter);
                if json {
                    return printJson(&tasks);
                }
                tasks.iter().for_each(|t| println!("{}", formatTask(t)));
            }
            Ok(())
        }
        Command::Add { title, description } => {
            let task = addTask(&dir, &title, description.as_deref())?;
            println!("Task added: [{}] {}", task.id, task.title);
            Ok(())
        }
        Command::Start { id } => {
            let task = startTask(&dir, &id)?.ok_or_else(|| notFound(&id))?;
            println!("Task started: [{}] {}", task.id, task.title);
            Ok(())
        }
        Command::Complete { id } => {
            let task = completeTask(&dir, &id)?.ok_or_else(|| notFound(&id))?;
            println!("Task completed: [{}] {}", task.id, task.title);
            Ok(())
        }
        Command::Snooze { id, date } => {
            let task = snoozeTask(&dir, &id, &date)?.ok_or_else(|| notFound(&id))?;
            println!("Task snoozed until {}: [{}] {}", date, task.id, task.title);
            Ok(())
        }
        Command::Remove { id } => {
            match removeTask(&dir, settings.serverUrl.as_deref(), &client, &id).await? {
                Removal::Local => println!("Task deleted: {}", id),
                Removal::Remote => println!("Task deleted on server: {}", id),
                Removal::NotFound => return Err(notFound(&id)),
            }
            Ok(())
        }
        Command::Watch => {
            let service = SyncService::spawn(dir, settings, |tasks| {
                println!("--- {} tasks ---", tasks.len());
                tasks.iter().for_each(|m| println!("{}", formatMerged(m)));
            });
            waitForShutdown().await;
            service.stop().await;
            Ok(())
        }
        Command::Serve { bind, port } => {
            let manager = HttpServerManager::new();
            manager.start(storage, &format!("{}:{}", bind, port)).await?;
            waitForShutdown().await;
            manager.stop();
            Ok(())
        }
        Command::Mcp => {
            use rmcp::{ServiceExt, transport::stdio};

            tracing::info!("[MCP] Serving {:?} over stdio", dir);
            let service = crate::mcp::DevFlowServer::new(storage)
                .serve(stdio())
                .await
                .map_err(|e| e.to_string())?;
            service.waiting().await.map_err(|e| e.to_string())?;
            Ok(())
        }
        Command::Config { save } => {
            if save {
                saveGlobalConfig(&settings)?;
            }
            printJson(&settings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "devflow", "list", "--status", "pending", "--dir", "/tmp/p", "--strict-dates",
        ])
        .unwrap();
        assert_eq!(cli.dir, PathBuf::from("/tmp/p"));
        assert!(cli.strict_dates);
        assert!(matches!(cli.command, Command::List { ref status, .. } if status.as_deref() == Some("pending")));
        assert_eq!(cli.settingsOverride().strictDateFilter, Some(true));
    }

    #[test]
    fn snooze_takes_id_and_date() {
        let cli = Cli::try_parse_from(["devflow", "snooze", "ab12cd34", "2030-01-01"]).unwrap();
        assert!(!cli.command.isLongRunning());
        match cli.command {
            Command::Snooze { id, date } => {
                assert_eq!(id, "ab12cd34");
                assert_eq!(date, "2030-01-01");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_project_dir_is_rejected_and_not_created() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("no-such-project");
        let args: Vec<OsString> = vec![
            "devflow".into(), "--dir".into(), missing.clone().into_os_string(), "add".into(), "x".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        let err = execute(cli).await.unwrap_err();
        assert!(err.starts_with("Directory does not exist"), "{}", err);
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn file_as_project_dir_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("notes.txt");
        fs::write(&file, "hi").unwrap();
        let args: Vec<OsString> = vec![
            "devflow".into(), "--dir".into(), file.clone().into_os_string(), "list".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        let err = execute(cli).await.unwrap_err();
        assert!(err.starts_with("Path is not a directory"), "{}", err);
    }

    #[test]
    fn serve_creates_its_project_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("workspace");
        checkProjectDir(&dir, true).unwrap();
        assert!(dir.is_dir());
        assert!(checkProjectDir(&tmp.path().join("other"), false).is_err());
    }

    #[test]
    fn formats_snoozed_tasks_with_target_date() {
        let mut task = Task::new("ab12cd34".into(), "Ship".into(), None, "t".into());
        task.snooze("2030-01-01".into());
        assert_eq!(formatTask(&task), "[ab12cd34] snoozed     Ship (until 2030-01-01)");
    }
}
