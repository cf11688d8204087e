use anyhow::Result;

use super::client::GeminiClient;
use super::TranslationBackend;

/// Build the translation instruction sent to the text model
pub fn translation_prompt(text: &str, from: &str, to: &str) -> String {
    format!(
        "Translate the following text from {} to {}. Return only the translated text.\n\nText: {}",
        from, to, text
    )
}

impl TranslationBackend for GeminiClient {
    fn translate(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": translation_prompt(text, from, to) }]
            }]
        });
        let response = self.generate_content(&self.translation_model, &body)?;
        Ok(response.text())
    }
}
