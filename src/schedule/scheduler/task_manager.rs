use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::queue::TaskQueue;
use crate::schedule::processors::TaskProcessor;
use crate::schedule::types::{
    output_data, Task, TaskLog, TaskOutcome, TaskRequest, TaskStatus, TaskType, TaskUpdate,
};

const UPDATE_ATTEMPTS: u32 = 3;
const UPDATE_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Registry of processors plus the queue they report to.
pub struct TaskManager {
    queue: Arc<dyn TaskQueue>,
    processors: HashMap<TaskType, Arc<dyn TaskProcessor>>,
    worker_id: String,
    domain: Option<String>,
    report_failures: bool,
    update_attempts: u32,
    update_retry_delay: Duration,
}

impl TaskManager {
    pub fn new(queue: Arc<dyn TaskQueue>, worker_id: impl Into<String>) -> Self {
        Self {
            queue,
            processors: HashMap::new(),
            worker_id: worker_id.into(),
            domain: None,
            report_failures: false,
            update_attempts: UPDATE_ATTEMPTS,
            update_retry_delay: UPDATE_RETRY_DELAY,
        }
    }

    /// How often a result update is tried before the result is given up.
    pub fn with_update_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.update_attempts = attempts.max(1);
        self.update_retry_delay = delay;
        self
    }

    pub fn with_domain(mut self, domain: Option<String>) -> Self {
        self.domain = domain;
        self
    }

    /// Send error-tagged outcomes as `FAILED` instead of `COMPLETED`.
    pub fn with_report_failures(mut self, report_failures: bool) -> Self {
        self.report_failures = report_failures;
        self
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn register_processor(&mut self, processor: Box<dyn TaskProcessor>) {
        let task_type = processor.task_type();
        info!("Registering processor for task type: {}", task_type);
        self.processors.insert(task_type, Arc::from(processor));
    }

    pub fn registered_types(&self) -> Vec<TaskType> {
        TaskType::ALL
            .into_iter()
            .filter(|task_type| self.processors.contains_key(task_type))
            .collect()
    }

    fn processor(&self, task_type: TaskType) -> Result<Arc<dyn TaskProcessor>> {
        self.processors
            .get(&task_type)
            .cloned()
            .ok_or_else(|| anyhow!("No processor found for task type: {}", task_type))
    }

    pub async fn poll_next(&self, task_type: TaskType) -> Result<Option<Task>> {
        self.queue
            .poll(task_type.definition_name(), &self.worker_id, self.domain.as_deref())
            .await
            .with_context(|| format!("Failed to poll {} tasks", task_type))
    }

    /// Run the processor in its own task so a panic becomes a failure.
    pub async fn invoke(&self, task_type: TaskType, request: TaskRequest) -> Result<TaskOutcome> {
        let processor = self.processor(task_type)?;
        let handle = tokio::spawn(async move { processor.invoke(&request).await });

        match handle.await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Processor for {} aborted: {}", task_type, e);
                Ok(TaskOutcome::Failed(format!("processor aborted: {}", e)))
            }
        }
    }

    pub fn build_update(&self, task: &Task, outcome: TaskOutcome) -> TaskUpdate {
        let failed = self.report_failures && outcome.is_error();
        let message = outcome.message();

        let log = match &message {
            Some(message) => message.clone(),
            None => format!("{} completed by {}", task.definition_name(), self.worker_id),
        };

        TaskUpdate {
            task_id: task.task_id.clone(),
            workflow_instance_id: task.workflow_instance_id.clone(),
            worker_id: self.worker_id.clone(),
            status: if failed { TaskStatus::Failed } else { TaskStatus::Completed },
            output_data: output_data(outcome.into_output()),
            reason_for_incompletion: if failed { message } else { None },
            logs: vec![TaskLog {
                log,
                task_id: task.task_id.clone(),
                created_time: Utc::now().timestamp_millis(),
            }],
        }
    }

    pub async fn complete(&self, task: &Task, outcome: TaskOutcome) -> Result<()> {
        let update = self.build_update(task, outcome);
        info!("Reporting task {} as {}", task.task_id, update.status);

        let mut attempt = 1;
        loop {
            match self.queue.update(&update).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.update_attempts => {
                    warn!(
                        "Update of task {} failed (attempt {}/{}): {}",
                        task.task_id, attempt, self.update_attempts, e
                    );
                    attempt += 1;
                    tokio::time::sleep(self.update_retry_delay).await;
                }
                Err(e) => {
                    error!(
                        "Result of task {} lost after {} update attempts",
                        task.task_id, attempt
                    );
                    return Err(e).with_context(|| format!("Failed to update task {}", task.task_id));
                }
            }
        }
    }
}
