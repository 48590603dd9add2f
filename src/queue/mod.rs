//! Access to the orchestrator's task queue.

use async_trait::async_trait;

use crate::error::Result;
use crate::schedule::types::{Task, TaskUpdate};

pub mod conductor;
#[cfg(test)]
pub mod memory;

pub use conductor::ConductorClient;

#[async_trait]
pub trait TaskQueue: Send + Sync + 'static {
    /// Claim the next task of a definition, `None` when the queue is empty.
    async fn poll(&self, task_type: &str, worker_id: &str, domain: Option<&str>) -> Result<Option<Task>>;
    async fn update(&self, update: &TaskUpdate) -> Result<()>;
}
