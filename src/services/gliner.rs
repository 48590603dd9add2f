//! Client for a hosted GLiNER PII model (`POST /predict`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{EntityQuery, EntityRecognizer, PredictedEntity};
use crate::error::Result;
use crate::utils::http::check_status;

const PROVIDER: &str = "gliner";

/// Default label set of the multilingual PII model.
pub const DEFAULT_PII_LABELS: &[&str] = &[
    "person",
    "organization",
    "address",
    "email",
    "phone number",
    "social security number",
    "credit card number",
    "passport number",
    "driver license",
    "bank account number",
    "date of birth",
    "medical record number",
    "insurance policy number",
    "property registration number",
    "employee ID number",
    "tax ID number",
    "full address",
    "personally identifiable information",
];

pub struct GlinerClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

// some deployments wrap the list, some return it bare
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictResponse {
    Bare(Vec<PredictedEntity>),
    Wrapped { entities: Vec<PredictedEntity> },
}

impl GlinerClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl EntityRecognizer for GlinerClient {
    async fn predict_entities(&self, query: &EntityQuery) -> Result<Vec<PredictedEntity>> {
        info!(
            "Predicting entities for {} chars with {} labels (threshold {})",
            query.text.len(),
            query.labels.len(),
            query.threshold
        );

        let mut builder = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(query);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = check_status(PROVIDER, builder.send().await?).await?;
        let entities = match serde_json::from_str(&response.text().await?)? {
            PredictResponse::Bare(entities) => entities,
            PredictResponse::Wrapped { entities } => entities,
        };
        Ok(entities)
    }
}
