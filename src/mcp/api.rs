use crate::commands::task::{addTask, completeTask, deleteTask, getTasks, snoozeTask, startTask};
use crate::storage::StorageState;

// ============================================
// Tasks API
// ============================================

pub fn get_all_tasks(storage: &StorageState, status: Option<&str>) -> Result<String, String> {
    let status = status.filter(|s| !s.trim().is_empty());
    let listing = getTasks(storage.projectDir(), status);
    serde_json::to_string_pretty(&listing).map_err(|e| e.to_string())
}

pub fn add_new_task(storage: &StorageState, title: &str, description: Option<&str>) -> Result<String, String> {
    let task = addTask(storage.projectDir(), title, description)?;
    Ok(format!("Task added: [{}] {}", task.id, task.title))
}

pub fn mark_task_started(storage: &StorageState, task_id: &str) -> Result<String, String> {
    Ok(match startTask(storage.projectDir(), task_id)? {
        Some(task) => format!("Task started: [{}] {}", task.id, task.title),
        None => notFound(task_id),
    })
}

pub fn mark_task_complete(storage: &StorageState, task_id: &str) -> Result<String, String> {
    Ok(match completeTask(storage.projectDir(), task_id)? {
        Some(task) => format!("Task completed: [{}] {}", task.id, task.title),
        None => notFound(task_id),
    })
}

pub fn snooze_a_task(storage: &StorageState, task_id: &str, date: &str) -> Result<String, String> {
    Ok(match snoozeTask(storage.projectDir(), task_id, date)? {
        Some(task) => format!("Task snoozed until {}: [{}] {}", date, task.id, task.title),
        None => notFound(task_id),
    })
}

pub fn remove_task(storage: &StorageState, task_id: &str) -> Result<String, String> {
    Ok(if deleteTask(storage.projectDir(), task_id)? {
        format!("Task deleted: {}", task_id)
    } else {
        notFound(task_id)
    })
}

fn notFound(task_id: &str) -> String {
    format!("Task not found: {}", task_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Settings;
    use crate::storage::{Storage, loadTasks};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> StorageState {
        Arc::new(Storage::new(dir.path().to_path_buf(), Settings::default()))
    }

    #[test]
    fn tool_messages_follow_task_lifecycle() {
        let dir = TempDir::new().unwrap();
        let s = storage(&dir);

        let added = add_new_task(&s, "Port parser", Some("use nom")).unwrap();
        let id = loadTasks(dir.path()).tasks[0].id.clone();
        assert_eq!(added, format!("Task added: [{}] Port parser", id));

        assert_eq!(mark_task_started(&s, &id).unwrap(), format!("Task started: [{}] Port parser", id));
        assert_eq!(
            snooze_a_task(&s, &id, "2030-01-01").unwrap(),
            format!("Task snoozed until 2030-01-01: [{}] Port parser", id)
        );
        assert_eq!(mark_task_complete(&s, &id).unwrap(), format!("Task completed: [{}] Port parser", id));
        assert_eq!(remove_task(&s, &id).unwrap(), format!("Task deleted: {}", id));
        assert_eq!(remove_task(&s, &id).unwrap(), format!("Task not found: {}", id));
        assert_eq!(mark_task_started(&s, "zzz").unwrap(), "Task not found: zzz");
    }

    #[test]
    fn listing_json_has_summary_and_filtered_tasks() {
        let dir = TempDir::new().unwrap();
        let s = storage(&dir);
        add_new_task(&s, "one", None).unwrap();
        add_new_task(&s, "two", None).unwrap();
        let id = loadTasks(dir.path()).tasks[0].id.clone();
        mark_task_complete(&s, &id).unwrap();

        let json: serde_json::Value = serde_json::from_str(&get_all_tasks(&s, Some("done")).unwrap()).unwrap();
        assert_eq!(json["summary"]["total"], 2);
        assert_eq!(json["summary"]["pending"], 1);
        assert_eq!(json["summary"]["done"], 1);
        assert_eq!(json["tasks"].as_array().unwrap().len(), 1);

        let all: serde_json::Value = serde_json::from_str(&get_all_tasks(&s, Some("")).unwrap()).unwrap();
        assert_eq!(all["tasks"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn blank_title_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(add_new_task(&storage(&dir), " ", None).is_err());
    }
}
