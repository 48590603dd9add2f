//! In-memory task queue for host tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::TaskQueue;
use crate::error::{Result, WorkerError};
use crate::schedule::types::{Task, TaskUpdate};

#[derive(Default)]
pub struct MemoryQueue {
    pending: Mutex<HashMap<String, VecDeque<Task>>>,
    updates: Mutex<Vec<TaskUpdate>>,
    // updates still to refuse before accepting
    refused_updates: AtomicUsize,
    update_attempts: AtomicUsize,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update is refused with a queue error.
    pub fn rejecting_updates() -> Self {
        Self::refusing_first_updates(usize::MAX)
    }

    pub fn refusing_first_updates(count: usize) -> Self {
        Self {
            refused_updates: AtomicUsize::new(count),
            ..Self::default()
        }
    }

    /// Update calls made so far, refused ones included.
    pub fn update_attempts(&self) -> usize {
        self.update_attempts.load(Ordering::SeqCst)
    }

    pub fn push(&self, task: Task) {
        self.pending
            .lock()
            .unwrap()
            .entry(task.definition_name().to_string())
            .or_default()
            .push_back(task);
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().values().map(VecDeque::len).sum()
    }

    pub fn updates(&self) -> Vec<TaskUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskQueue for MemoryQueue {
    async fn poll(&self, task_type: &str, _worker_id: &str, _domain: Option<&str>) -> Result<Option<Task>> {
        Ok(self
            .pending
            .lock()
            .unwrap()
            .get_mut(task_type)
            .and_then(VecDeque::pop_front))
    }

    async fn update(&self, update: &TaskUpdate) -> Result<()> {
        self.update_attempts.fetch_add(1, Ordering::SeqCst);
        let refuse = self
            .refused_updates
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if refuse {
            return Err(WorkerError::Queue("update refused".to_string()));
        }
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }
}
