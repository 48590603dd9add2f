mod task_manager;
mod worker;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use anyhow::Result;
use tracing::info;

pub use task_manager::TaskManager;
use worker::TaskWorker;
use crate::schedule::types::TaskType;

pub struct TaskScheduler {
    task_manager: Arc<TaskManager>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown: watch::Sender<bool>,
    poll_interval: Duration,
    concurrency: usize,
}

impl TaskScheduler {
    pub fn new(task_manager: Arc<TaskManager>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            task_manager,
            workers: Mutex::new(Vec::new()),
            shutdown,
            poll_interval: Duration::from_secs(1),
            concurrency: 1,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn task_manager(&self) -> Arc<TaskManager> {
        self.task_manager.clone()
    }

    /// Start `concurrency` polling loops for one task type.
    pub async fn spawn_worker(&self, task_type: TaskType) {
        let mut workers = self.workers.lock().await;
        for _ in 0..self.concurrency {
            let worker = TaskWorker::new(self.task_manager.clone(), task_type, self.shutdown.subscribe())
                .with_interval(self.poll_interval);
            workers.push(tokio::spawn(worker.run()));
        }
    }

    pub async fn spawn_all(&self) {
        for task_type in self.task_manager.registered_types() {
            self.spawn_worker(task_type).await;
        }
        info!(
            "Polling {} task type(s) with {} loop(s) each",
            self.task_manager.registered_types().len(),
            self.concurrency
        );
    }

    /// Ask every loop to stop once its in-flight task is reported.
    pub fn shutdown(&self) {
        info!("Stopping task workers");
        let _ = self.shutdown.send(true);
    }

    /// Wait for all workers to finish.
    pub async fn run(&self) -> Result<()> {
        let mut workers = self.workers.lock().await;
        for worker in workers.drain(..) {
            worker.await?;
        }
        Ok(())
    }
}
