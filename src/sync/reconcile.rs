// Reconciliation of local and remote task lists
// Local wins on id collision; remote is strictly additive

use serde::Serialize;
use std::collections::HashSet;

use crate::models::Task;

/// Where a task in the merged view came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOrigin {
    Local,
    Remote,
}

/// Task as displayed: wholly local or wholly remote
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedTask {
    #[serde(flatten)]
    pub task: Task,
    pub origin: TaskOrigin,
}

/// Full local list, then every remote task whose id is not local, both in source order
pub fn reconcile(local: &[Task], remote: Option<&[Task]>) -> Vec<MergedTask> {
    let localIds: HashSet<&str> = local.iter().map(|t| t.id.as_str()).collect();

    let mut merged: Vec<MergedTask> = local
        .iter()
        .map(|t| MergedTask { task: t.clone(), origin: TaskOrigin::Local })
        .collect();

    if let Some(remote) = remote {
        merged.extend(
            remote
                .iter()
                .filter(|t| !localIds.contains(t.id.as_str()))
                .map(|t| MergedTask { task: t.clone(), origin: TaskOrigin::Remote }),
        );
    }

    merged
}

/// Sorted `id:status` pairs joined with commas
pub fn fingerprint(tasks: &[MergedTask]) -> String {
    let mut pairs: Vec<String> = tasks
        .iter()
        .map(|m| format!("{}:{}", m.task.id, m.task.status))
        .collect();
    pairs.sort();
    pairs.join(",")
}

/// Remembers the last fingerprint so unchanged refreshes can be skipped
#[derive(Debug, Default)]
pub struct Reconciler {
    lastFingerprint: Option<String>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merged list when it differs from the previous cycle, `None` for a no-op refresh.
    /// The first call always reports.
    pub fn refresh(&mut self, local: &[Task], remote: Option<&[Task]>) -> Option<Vec<MergedTask>> {
        let merged = reconcile(local, remote);
        let print = fingerprint(&merged);

        if self.lastFingerprint.as_deref() == Some(print.as_str()) {
            return None;
        }

        self.lastFingerprint = Some(print);
        Some(merged)
    }

    /// Force the next refresh to report
    pub fn reset(&mut self) {
        self.lastFingerprint = None;
    }
}
