// Change notification service
// One file watcher plus one fixed-interval poll, reported through a single on-change callback

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::reconcile::{MergedTask, Reconciler};
use crate::models::Settings;
use crate::remote::RemoteClient;
use crate::storage::{TASKS_FILENAME, loadTasks};

pub struct SyncService {
    cancel: CancellationToken,
    trigger: mpsc::Sender<()>,
    handle: JoinHandle<()>,
    _watcher: Option<RecommendedWatcher>,
}

fn watchStoreFile(projectDir: &Path, trigger: mpsc::Sender<()>) -> Result<RecommendedWatcher, String> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            let touchesStore = event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(OsStr::new(TASKS_FILENAME)));
            if touchesStore {
                // A pending trigger already covers this change
                let _ = trigger.try_send(());
            }
        }
        Err(e) => tracing::warn!("[Sync] Watch error: {}", e),
    })
    .map_err(|e| e.to_string())?;

    watcher
        .watch(projectDir, RecursiveMode::NonRecursive)
        .map_err(|e| e.to_string())?;
    Ok(watcher)
}

impl SyncService {
    /// Start watching `projectDir`. Must be called inside a tokio runtime.
    /// `onChange` receives the merged list on the first cycle and whenever its
    /// fingerprint changes afterwards.
    pub fn spawn<F>(projectDir: PathBuf, settings: Settings, onChange: F) -> Self
    where
        F: Fn(Vec<MergedTask>) + Send + Sync + 'static,
    {
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel::<()>(1);

        let watcher = match watchStoreFile(&projectDir, tx.clone()) {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::warn!("[Sync] File watching unavailable ({}), polling only", e);
                None
            }
        };

        let client = RemoteClient::new(Duration::from_secs(settings.requestTimeoutSecs.max(1)));
        let pollEvery = Duration::from_secs(settings.pollIntervalSecs.max(1));
        let ct = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut reconciler = Reconciler::new();
            let mut interval = tokio::time::interval(pollEvery);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                "[Sync] Watching {:?} (remote: {:?}, every {:?})",
                projectDir,
                settings.serverUrl,
                pollEvery
            );

            loop {
                tokio::select! {
                    _ = ct.cancelled() => break,
                    _ = interval.tick() => {}
                    Some(()) = rx.recv() => {}
                }

                let local = loadTasks(&projectDir).tasks;
                let remote = match settings.serverUrl.as_deref() {
                    Some(url) => Some(client.fetchAll(url).await.tasks),
                    None => None,
                };

                if let Some(merged) = reconciler.refresh(&local, remote.as_deref()) {
                    tracing::debug!("[Sync] {} tasks changed, notifying", merged.len());
                    onChange(merged);
                }
            }

            tracing::info!("[Sync] Stopped");
        });

        Self {
            cancel,
            trigger: tx,
            handle,
            _watcher: watcher,
        }
    }

    /// Ask for a refresh without waiting for the next poll
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop polling and watching; waits for the current cycle to finish
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!("[Sync] Task ended abnormally: {}", e);
        }
    }
}
