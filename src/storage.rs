// File-backed storage layer for DevFlow
// One pretty-printed JSON file per project, always rewritten in full

use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::commands::common::now;
use crate::models::{Settings, SettingsOverride, TaskStoreFile};

pub const TASKS_FILENAME: &str = ".tasks.json";

// ============================================
// PATH HELPERS
// ============================================

/// Global config directory (~/.devflow/)
pub fn globalConfigDir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".devflow"))
}

/// Global config file path
pub fn globalConfigPath() -> Option<PathBuf> {
    globalConfigDir().map(|dir| dir.join("config.json"))
}

/// Store file for a project root
pub fn tasksPath(projectDir: &Path) -> PathBuf {
    projectDir.join(TASKS_FILENAME)
}

fn tempPath(projectDir: &Path) -> PathBuf {
    projectDir.join(format!("{}.tmp", TASKS_FILENAME))
}

// ============================================
// LOAD / SAVE
// ============================================

/// Load the store, falling back to an empty one when the file is missing or unreadable
pub fn loadTasks(projectDir: &Path) -> TaskStoreFile {
    let path = tasksPath(projectDir);

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("[Store] Failed to read {:?}: {}, using empty store", path, e);
            }
            return TaskStoreFile::empty(now());
        }
    };

    match serde_json::from_str::<TaskStoreFile>(&content) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("[Store] Failed to parse {:?}: {}, using empty store", path, e);
            TaskStoreFile::empty(now())
        }
    }
}

/// Stamp `lastUpdated` and replace the file in full
pub fn saveTasks(projectDir: &Path, file: &mut TaskStoreFile) -> Result<(), String> {
    file.lastUpdated = now();

    fs::create_dir_all(projectDir).map_err(|e| e.to_string())?;

    let json = serde_json::to_string_pretty(&*file).map_err(|e| format!("JSON error: {}", e))?;

    // Write beside the target and rename over it so readers never see a torn file
    let tmp = tempPath(projectDir);
    fs::write(&tmp, json).map_err(|e| e.to_string())?;
    fs::rename(&tmp, tasksPath(projectDir)).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        e.to_string()
    })?;

    tracing::debug!("[Store] Saved {} tasks to {:?}", file.tasks.len(), projectDir);
    Ok(())
}

// ============================================
// STORAGE STATE
// ============================================

/// Shared state for the servers: which project, which settings
pub struct Storage {
    pub projectDir: PathBuf,
    pub settings: RwLock<Settings>,
}

impl Storage {
    pub fn new(projectDir: PathBuf, settings: Settings) -> Self {
        tracing::info!("[Storage::new] Project directory: {:?}", projectDir);
        Self {
            projectDir,
            settings: RwLock::new(settings),
        }
    }

    pub fn projectDir(&self) -> &Path {
        &self.projectDir
    }

    pub fn serverUrl(&self) -> Option<String> {
        self.settings.read().serverUrl.clone()
    }
}

pub type StorageState = Arc<Storage>;

/// Initialize storage from the global config plus per-invocation overrides
pub fn initStorage(projectDir: PathBuf, over: &SettingsOverride) -> StorageState {
    let settings = loadGlobalConfig().withOverride(over);
    Arc::new(Storage::new(projectDir, settings))
}

// ============================================
// GLOBAL CONFIG
// ============================================

pub fn loadGlobalConfig() -> Settings {
    match globalConfigPath() {
        Some(path) => loadConfigFrom(&path),
        None => {
            tracing::warn!("[loadGlobalConfig] No home directory, using defaults");
            Settings::default()
        }
    }
}

pub fn loadConfigFrom(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            tracing::debug!("[loadGlobalConfig] {:?} not found, using defaults", path);
            return Settings::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!("[loadGlobalConfig] Failed to parse {:?}: {}, using defaults", path, e);
        Settings::default()
    })
}

pub fn saveGlobalConfig(settings: &Settings) -> Result<(), String> {
    let path = globalConfigPath().ok_or("No home directory")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
    fs::write(&path, json).map_err(|e| e.to_string())
}
