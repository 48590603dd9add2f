use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use tracing::{error, info};
use anyhow::Result;

use crate::schedule::types::TaskType;
use super::TaskManager;

pub struct TaskWorker {
    task_manager: Arc<TaskManager>,
    // task type. e.g. Transcribe
    task_type: TaskType,
    // idle wait between empty polls
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl TaskWorker {
    pub fn new(task_manager: Arc<TaskManager>, task_type: TaskType, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            task_manager,
            task_type,
            interval: Duration::from_secs(1),
            shutdown,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn run(mut self) {
        info!("Worker for {} started", self.task_type);
        while !self.stopping() {
            let idle = match self.process_next_task().await {
                Ok(true) => continue,
                Ok(false) => self.interval,
                Err(e) => {
                    error!("Error processing {} task: {:#}", self.task_type, e);
                    Duration::from_millis(100)
                }
            };
            if !self.wait(idle).await {
                break;
            }
        }
        info!("Worker for {} stopped", self.task_type);
    }

    fn stopping(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleep unless shutdown is signalled first; false means stop.
    async fn wait(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = sleep(duration) => true,
            changed = self.shutdown.changed() => changed.is_ok() && !self.stopping(),
        }
    }

    async fn process_next_task(&self) -> Result<bool> {
        let task = match self.task_manager.poll_next(self.task_type).await? {
            Some(task) => task,
            None => return Ok(false),
        };

        info!("Processing {} task: {}", self.task_type, task.task_id);
        let outcome = self.task_manager.invoke(self.task_type, task.request()).await?;
        self.task_manager.complete(&task, outcome).await?;
        Ok(true)
    }
}
