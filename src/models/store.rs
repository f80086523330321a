// Persisted store file (.tasks.json)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::task::Task;

pub const STORE_VERSION: u32 = 1;

fn defaultVersion() -> u32 {
    STORE_VERSION
}

/// Whole-file representation of a project's tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStoreFile {
    #[serde(default = "defaultVersion")]
    pub version: u32,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub lastUpdated: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskStoreFile {
    /// Empty store stamped with `lastUpdated`
    pub fn empty(lastUpdated: String) -> Self {
        Self {
            version: STORE_VERSION,
            tasks: Vec::new(),
            lastUpdated,
            extra: Map::new(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn findMut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }
}
