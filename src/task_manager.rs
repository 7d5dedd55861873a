//! Background task lifecycle: spawn with a cancellation token, join on stop.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How long `shutdown_all` waits for a single task to finish.
const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Tracks background tasks so they can be cancelled and joined together.
///
/// Every task gets a child of one shared token. `shutdown_all` cancels that
/// token and waits for every task to return, so nothing spawned here is still
/// running once it completes (unless a task overruns the join timeout).
pub struct TaskManager {
    tasks: HashMap<String, JoinHandle<Result<()>>>,
    global_token: CancellationToken,
}

impl TaskManager {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            global_token: CancellationToken::new(),
        }
    }

    /// Spawns and registers a task with the given name.
    ///
    /// `task_fn` receives the task's cancellation token and must return once
    /// it is cancelled.
    pub fn spawn_task<F, Fut>(&mut self, name: impl Into<String>, task_fn: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        let name = name.into();
        let task_token = self.global_token.child_token();
        let task_name = name.clone();

        let handle = tokio::spawn(async move {
            info!("Starting task: {}", task_name);
            match task_fn(task_token).await {
                Ok(()) => {
                    info!("Task '{}' completed successfully", task_name);
                    Ok(())
                }
                Err(e) => {
                    error!("Task '{}' failed: {}", task_name, e);
                    Err(e)
                }
            }
        });

        if self.tasks.insert(name.clone(), handle).is_some() {
            warn!("Task '{}' replaced a task with the same name", name);
        }
    }

    /// Cancels every task and waits for all of them to finish.
    ///
    /// Returns the first error encountered, if any.
    pub async fn shutdown_all(&mut self) -> Result<()> {
        info!("Stopping all {} tasks", self.tasks.len());

        self.global_token.cancel();

        let mut first_error = None;
        for (name, handle) in self.tasks.drain() {
            let outcome = match tokio::time::timeout(JOIN_TIMEOUT, handle).await {
                Ok(Ok(Ok(()))) => continue,
                Ok(Ok(Err(e))) => e.context(format!("Task '{name}' failed")),
                Ok(Err(e)) => anyhow::anyhow!("Task '{name}' panicked: {e}"),
                Err(_) => anyhow::anyhow!("Task '{name}' did not stop within {JOIN_TIMEOUT:?}"),
            };
            warn!("{outcome:#}");
            first_error.get_or_insert(outcome);
        }

        if let Some(error) = first_error {
            Err(error).context("One or more tasks failed during shutdown")
        } else {
            info!("All tasks stopped");
            Ok(())
        }
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.tasks.get(name).is_some_and(|handle| !handle.is_finished())
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    #[tokio::test]
    async fn shutdown_cancels_and_joins() {
        let mut manager = TaskManager::new();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        manager.spawn_task("waiter", move |token| async move {
            token.cancelled().await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        assert!(manager.is_running("waiter"));

        manager.shutdown_all().await.unwrap();

        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(manager.active_count(), 0);
        assert!(!manager.is_running("waiter"));
    }

    #[tokio::test]
    async fn shutdown_reports_task_error() {
        let mut manager = TaskManager::new();
        manager.spawn_task("broken", |_token| async { anyhow::bail!("boom") });

        let err = manager.shutdown_all().await.unwrap_err();
        assert!(format!("{err:#}").contains("boom"));
    }

    #[tokio::test]
    async fn shutdown_reports_panics() {
        let mut manager = TaskManager::new();
        manager.spawn_task("panicky", |_token| async {
            if true {
                panic!("kaboom");
            }
            Ok(())
        });

        assert!(manager.shutdown_all().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_gives_up_on_stuck_task() {
        let mut manager = TaskManager::new();
        manager.spawn_task("stuck", |_token| async {
            std::future::pending::<()>().await;
            Ok(())
        });

        let err = manager.shutdown_all().await.unwrap_err();
        assert!(format!("{err:#}").contains("did not stop"));
    }
}
