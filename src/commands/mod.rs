// Commands module - operations on a project's task store

pub mod common;
pub mod task;
