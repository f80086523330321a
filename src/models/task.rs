// Task model for the .tasks.json store
// Short random id, lifecycle status, string timestamps kept as written

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::TaskStatus;

/// A single unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub createdAt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completedAt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snoozedUntil: Option<String>,
    /// Fields written by other front-ends, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(id: String, title: String, description: Option<String>, createdAt: String) -> Self {
        Self {
            id,
            title,
            description,
            status: TaskStatus::Pending,
            createdAt,
            completedAt: None,
            snoozedUntil: None,
            extra: Map::new(),
        }
    }

    /// `completedAt` and `snoozedUntil` survive re-entry into pending/in_progress
    /// as last-known markers.
    pub fn start(&mut self) {
        self.status = TaskStatus::InProgress;
    }

    pub fn complete(&mut self, at: String) {
        self.status = TaskStatus::Done;
        self.completedAt = Some(at);
    }

    pub fn snooze(&mut self, until: String) {
        self.status = TaskStatus::Snoozed;
        self.snoozedUntil = Some(until);
    }
}
