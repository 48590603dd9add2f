pub mod extract;
pub mod greeting;
pub mod ocr;
pub mod pii;
pub mod query;
pub mod structured_ocr;
pub mod transcribe;
pub mod translate;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, WorkerError};
use crate::schedule::types::{TaskOutcome, TaskRequest, TaskType};

pub use extract::StructuredExtractionProcessor;
pub use greeting::GreetingProcessor;
pub use ocr::DocumentOcrProcessor;
pub use pii::PiiProcessor;
pub use query::QueryProcessor;
pub use structured_ocr::StructuredOcrProcessor;
pub use transcribe::TranscribeProcessor;
pub use translate::TranslateProcessor;

/// One adapter per task type. Implementors validate and call out; `invoke`
/// turns every error into an error-tagged outcome.
#[async_trait]
pub trait TaskProcessor: Send + Sync {
    fn task_type(&self) -> TaskType;

    /// Checked before any external call is made.
    fn validate_params(&self, request: &TaskRequest) -> Result<()>;

    async fn process(&self, request: &TaskRequest) -> Result<Value>;

    /// Outcome for an error raised by `validate_params` or `process`.
    fn on_error(&self, error: &WorkerError) -> TaskOutcome {
        TaskOutcome::from_error(error)
    }

    async fn invoke(&self, request: &TaskRequest) -> TaskOutcome {
        if let Err(e) = self.validate_params(request) {
            warn!("Rejected {} task: {}", self.task_type(), e);
            return self.on_error(&e);
        }

        match self.process(request).await {
            Ok(value) => TaskOutcome::Completed(value),
            Err(e) => {
                warn!("Failed to process {} task: {}", self.task_type(), e);
                self.on_error(&e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn request(value: Value) -> TaskRequest {
    serde_json::from_value(value).expect("task request must be a JSON object")
}
