use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::TaskProcessor;
use crate::error::Result;
use crate::schedule::types::{TaskRequest, TaskType};

/// Smoke-test worker: answers `hello, <name>` without calling anything.
#[derive(Clone, Default)]
pub struct GreetingProcessor;

#[async_trait]
impl TaskProcessor for GreetingProcessor {
    fn task_type(&self) -> TaskType {
        TaskType::Greeting
    }

    fn validate_params(&self, request: &TaskRequest) -> Result<()> {
        request.require_str("name").map(|_| ())
    }

    async fn process(&self, request: &TaskRequest) -> Result<Value> {
        let name = request.require_str("name")?;
        info!("Greeting worker called with name: {}", name);
        Ok(Value::String(format!("hello, {}", name)))
    }
}
