//! Client for a hosted IndicTrans translation model (`POST /translate`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{TranslationRequest, TranslationResponse, Translator};
use crate::error::Result;
use crate::utils::http::check_status;

const PROVIDER: &str = "indictrans";

pub struct IndicTransClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranslateReply {
    Wrapped(TranslationResponse),
    Bare(Vec<String>),
}

impl IndicTransClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl Translator for IndicTransClient {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse> {
        info!(
            "Translating {} sentence(s) {} -> {}",
            request.sentences.len(),
            request.src_lang,
            request.tgt_lang
        );

        let mut builder = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = check_status(PROVIDER, builder.send().await?).await?;
        Ok(match serde_json::from_str(&response.text().await?)? {
            TranslateReply::Wrapped(reply) => reply,
            TranslateReply::Bare(translations) => TranslationResponse { translations },
        })
    }
}
