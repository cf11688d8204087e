use anyhow::{anyhow, bail, Context, Result};
use lazy_static::lazy_static;
use serde_json::Value;

use super::types::GenerateContentResponse;
use crate::config::Config;

lazy_static! {
    /// Shared HTTP agent (connection pooling across requests)
    pub static ref UREQ_AGENT: ureq::Agent = ureq::Agent::new_with_defaults();
}

/// Speech payloads are large; two minutes of 24kHz audio is ~8MB of base64
const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

/// Minimal client for the Gemini REST `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    pub translation_model: String,
    pub tts_model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            agent: UREQ_AGENT.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
            translation_model: config.translation_model.clone(),
            tts_model: config.tts_model.clone(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// POST a `generateContent` body and parse the response
    pub fn generate_content(&self, model: &str, body: &Value) -> Result<GenerateContentResponse> {
        if self.api_key.trim().is_empty() {
            bail!("Gemini API key is not configured");
        }

        let url = self.endpoint(model);
        tracing::debug!(%model, "POST generateContent");
        let mut response = self
            .agent
            .post(&url)
            .header("x-goog-api-key", self.api_key.as_str())
            .send_json(body)
            .map_err(|e| anyhow!("request to {} failed: {}", model, e))?;

        response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_json::<GenerateContentResponse>()
            .with_context(|| format!("decoding {} response", model))
    }
}
