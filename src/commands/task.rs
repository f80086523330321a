// Task commands - local store operations over .tasks.json
// Every mutation is an independent load / modify / save of the whole file

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use std::path::Path;

use super::common::{now, uniqueId};
use crate::models::{Task, TaskStatus};
use crate::storage::{loadTasks, saveTasks};

// ============================================
// MUTATIONS
// ============================================

/// Append a new pending task and persist it
pub fn addTask(projectDir: &Path, title: &str, description: Option<&str>) -> Result<Task, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Task title must not be empty".to_string());
    }

    let mut file = loadTasks(projectDir);
    let id = uniqueId(|candidate| file.contains(candidate));
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let task = Task::new(id, title.to_string(), description, now());
    file.tasks.push(task.clone());
    saveTasks(projectDir, &mut file)?;

    tracing::info!("[Store] Added task [{}] {}", task.id, task.title);
    Ok(task)
}

/// Load, apply `mutate` to the task with `id`, save. `Ok(None)` when the id is unknown;
/// the file is not rewritten in that case.
fn updateTask(projectDir: &Path, id: &str, mutate: impl FnOnce(&mut Task)) -> Result<Option<Task>, String> {
    let mut file = loadTasks(projectDir);

    let updated = match file.findMut(id) {
        Some(task) => {
            mutate(task);
            task.clone()
        }
        None => {
            tracing::debug!("[Store] Task not found: {}", id);
            return Ok(None);
        }
    };

    saveTasks(projectDir, &mut file)?;
    Ok(Some(updated))
}

pub fn startTask(projectDir: &Path, id: &str) -> Result<Option<Task>, String> {
    updateTask(projectDir, id, Task::start)
}

pub fn completeTask(projectDir: &Path, id: &str) -> Result<Option<Task>, String> {
    let at = now();
    updateTask(projectDir, id, |task| task.complete(at))
}

/// `date` is stored as given; it is not checked for format or for being in the future
pub fn snoozeTask(projectDir: &Path, id: &str, date: &str) -> Result<Option<Task>, String> {
    updateTask(projectDir, id, |task| task.snooze(date.to_string()))
}

/// Remove the task with `id`; `Ok(false)` when nothing matched
pub fn deleteTask(projectDir: &Path, id: &str) -> Result<bool, String> {
    let mut file = loadTasks(projectDir);
    let before = file.tasks.len();
    file.tasks.retain(|t| t.id != id);

    if file.tasks.len() == before {
        return Ok(false);
    }

    saveTasks(projectDir, &mut file)?;
    tracing::info!("[Store] Deleted task {}", id);
    Ok(true)
}

// ============================================
// QUERIES
// ============================================

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub date: Option<NaiveDate>,
    /// Non-snoozed tasks must have been created on `date` instead of always matching
    pub strictDate: bool,
}

/// Calendar day of a stored timestamp or `YYYY-MM-DD` string
pub fn parseDay(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(day);
    }
    let datePart = value.split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(datePart, "%Y-%m-%d").ok()
}

fn matchesDate(task: &Task, date: NaiveDate, strict: bool) -> bool {
    if task.status == TaskStatus::Snoozed {
        // Due once the snooze date has been reached
        return task
            .snoozedUntil
            .as_deref()
            .and_then(parseDay)
            .is_some_and(|until| until <= date);
    }

    let createdOn = parseDay(&task.createdAt).is_some_and(|day| day == date);
    createdOn || !strict
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        match self.date {
            Some(date) => matchesDate(task, date, self.strictDate),
            None => true,
        }
    }
}

/// Tasks matching `filter`, in file order
pub fn filterTasks(projectDir: &Path, filter: &TaskFilter) -> Vec<Task> {
    loadTasks(projectDir)
        .tasks
        .into_iter()
        .filter(|t| filter.matches(t))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub done: usize,
    pub snoozed: usize,
}

impl TaskSummary {
    pub fn of(tasks: &[Task]) -> Self {
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        Self {
            total: tasks.len(),
            pending: count(TaskStatus::Pending),
            in_progress: count(TaskStatus::InProgress),
            done: count(TaskStatus::Done),
            snoozed: count(TaskStatus::Snoozed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskListing {
    pub summary: TaskSummary,
    pub tasks: Vec<Task>,
}

/// Summary over the whole store plus tasks filtered by an optional status name.
/// An unrecognised status name filters nothing.
pub fn getTasks(projectDir: &Path, status: Option<&str>) -> TaskListing {
    let all = loadTasks(projectDir).tasks;
    let summary = TaskSummary::of(&all);

    let tasks = match status.and_then(TaskStatus::fromName) {
        Some(s) => all.into_iter().filter(|t| t.status == s).collect(),
        None => all,
    };

    TaskListing { summary, tasks }
}
