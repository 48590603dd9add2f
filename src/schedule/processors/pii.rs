use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::TaskProcessor;
use crate::error::{Result, WorkerError};
use crate::normalize::normalize_pii;
use crate::schedule::types::{TaskOutcome, TaskRequest, TaskType};
use crate::services::gliner::DEFAULT_PII_LABELS;
use crate::services::{EntityQuery, EntityRecognizer};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Comma separated labels, each trimmed. A list is accepted as well.
fn parse_labels(request: &TaskRequest) -> Result<Vec<String>> {
    let labels: Vec<String> = request
        .string_list("labels")?
        .unwrap_or_default()
        .iter()
        .flat_map(|item| item.split(','))
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect();

    if labels.is_empty() {
        return Ok(DEFAULT_PII_LABELS.iter().map(|l| l.to_string()).collect());
    }
    Ok(labels)
}

pub fn entity_query(request: &TaskRequest) -> Result<EntityQuery> {
    let text = request.require_str("text")?;
    let threshold = request.optional_f64("threshold")?.unwrap_or(DEFAULT_THRESHOLD);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(WorkerError::invalid(
            "threshold",
            format!("{} is outside 0..=1", threshold),
        ));
    }
    let nested_ner = request.optional_bool("nested_ner")?.unwrap_or(false);

    Ok(EntityQuery {
        text,
        labels: parse_labels(request)?,
        threshold: threshold as f32,
        flat_ner: !nested_ner,
    })
}

#[derive(Clone)]
pub struct PiiProcessor {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl PiiProcessor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }
}

#[async_trait]
impl TaskProcessor for PiiProcessor {
    fn task_type(&self) -> TaskType {
        TaskType::PiiExtraction
    }

    fn validate_params(&self, request: &TaskRequest) -> Result<()> {
        entity_query(request).map(|_| ())
    }

    async fn process(&self, request: &TaskRequest) -> Result<Value> {
        let query = entity_query(request)?;
        info!(
            "PII worker called with {} chars, {} labels",
            query.text.chars().count(),
            query.labels.len()
        );

        let entities = self.recognizer.predict_entities(&query).await?;
        Ok(normalize_pii(&query.text, &entities))
    }

    fn on_error(&self, error: &WorkerError) -> TaskOutcome {
        match error {
            WorkerError::MissingParameter(name) if name == "text" => {
                TaskOutcome::Declined("No text provided".to_string())
            }
            _ => TaskOutcome::from_error(error),
        }
    }
}
