// Models module for DevFlow task storage
// All fields use camelCase for consistency with the JSON on disk

pub mod common;
pub mod config;
pub mod store;
pub mod task;

pub use common::TaskStatus;
pub use config::{Settings, SettingsOverride};
pub use store::{STORE_VERSION, TaskStoreFile};
pub use task::Task;
