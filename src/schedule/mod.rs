use std::sync::Arc;

pub mod types;
pub mod processors;
pub mod scheduler;
#[cfg(test)]
mod tests;

pub use types::{Task, TaskOutcome, TaskRequest, TaskStatus, TaskType, TaskUpdate};

pub use processors::{
    DocumentOcrProcessor, GreetingProcessor, PiiProcessor, QueryProcessor,
    StructuredExtractionProcessor, StructuredOcrProcessor, TaskProcessor, TranscribeProcessor,
    TranslateProcessor,
};

pub use scheduler::{TaskManager, TaskScheduler};

use crate::config::ConductorSettings;
use crate::queue::TaskQueue;
use crate::services::ServiceClients;

/// Every worker the deployed workflows expect, wired to the given clients.
pub fn default_processors(clients: &ServiceClients) -> Vec<Box<dyn TaskProcessor>> {
    vec![
        Box::new(GreetingProcessor),
        Box::new(DocumentOcrProcessor::new(clients.ocr.clone())),
        Box::new(StructuredOcrProcessor::new(clients.ocr.clone(), clients.vision_chat.clone())),
        Box::new(TranscribeProcessor::new(clients.transcription.clone())),
        Box::new(PiiProcessor::new(clients.recognizer.clone())),
        Box::new(QueryProcessor::new(clients.query_chat.clone())),
        Box::new(TranslateProcessor::new(clients.translator.clone())),
        Box::new(StructuredExtractionProcessor::new(clients.extraction_chat.clone())),
    ]
}

pub fn create_scheduler(
    queue: Arc<dyn TaskQueue>,
    processors: Vec<Box<dyn TaskProcessor>>,
    settings: &ConductorSettings,
) -> TaskScheduler {
    let mut task_manager = TaskManager::new(queue, settings.worker_id.clone())
        .with_domain(settings.domain.clone())
        .with_report_failures(settings.report_failures);

    for processor in processors {
        task_manager.register_processor(processor);
    }

    TaskScheduler::new(Arc::new(task_manager))
        .with_poll_interval(settings.poll_interval)
        .with_concurrency(settings.concurrency)
}
