//! Speech synthesis through the provider's audio API.
//!
//! Backs the `generate_audio` function tool exposed to agents.

use crate::agent::{FunctionParameter, ParameterKind, Tool};
use crate::error::{Result, StafettError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for synthesis requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Voices the provider's speech endpoint accepts.
pub const VOICES: &[&str] = &["alloy", "echo", "fable", "luna", "nova", "shimmer"];

/// Client for an OpenAI-compatible `/audio/speech` endpoint.
pub struct SpeechSynthesizer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl SpeechSynthesizer {
    /// Create a synthesizer against the given endpoint and model.
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(StafettError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Synthesize `text` with the given voice, returning the audio bytes.
    pub async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        debug!(voice, chars = text.len(), "Synthesizing speech");

        let response = self
            .http
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "input": text,
                "voice": voice,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StafettError::Audio(format!(
                "Speech endpoint returned {status}: {body}"
            )));
        }

        let bytes = response.bytes().await?;
        info!(bytes = bytes.len(), "Speech synthesis complete");
        Ok(bytes.to_vec())
    }
}

/// Build the `generate_audio` function tool backed by a synthesizer.
///
/// The handler returns `{"success": true, "audio": "<base64>", "format": "mp3"}`
/// on success; synthesis failures surface to the model as tool errors.
pub fn generate_audio_tool(synthesizer: Arc<SpeechSynthesizer>, default_voice: &str) -> Tool {
    let default_voice = default_voice.to_string();

    Tool::function(
        "generate_audio",
        "Generate spoken audio from text. Returns base64-encoded MP3 data.",
        vec![
            FunctionParameter::new("text", ParameterKind::String, "The text to convert to speech"),
            FunctionParameter::new("voice_type", ParameterKind::String, "Voice to use")
                .optional()
                .with_enum_values(VOICES.iter().copied()),
        ],
        move |args: Value| {
            let synthesizer = synthesizer.clone();
            let default_voice = default_voice.clone();
            async move {
                let text = args
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| StafettError::Tool("Missing 'text' argument".to_string()))?
                    .to_string();
                let voice = args
                    .get("voice_type")
                    .and_then(Value::as_str)
                    .unwrap_or(&default_voice)
                    .to_string();

                let bytes = synthesizer.synthesize(&text, &voice).await?;
                Ok(json!({
                    "success": true,
                    "audio": BASE64.encode(&bytes),
                    "format": "mp3",
                }))
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesizer() -> Arc<SpeechSynthesizer> {
        Arc::new(SpeechSynthesizer::new("https://api.openai.com/v1", "key", "tts-1").unwrap())
    }

    #[test]
    fn test_generate_audio_tool_spec() {
        let tool = generate_audio_tool(synthesizer(), "alloy");
        let spec = serde_json::to_value(tool.spec().unwrap()).unwrap();

        assert_eq!(spec["function"]["name"], "generate_audio");
        assert_eq!(
            spec["function"]["parameters"]["required"],
            serde_json::json!(["text"])
        );
        let voices = &spec["function"]["parameters"]["properties"]["voice_type"]["enum"];
        assert!(voices.as_array().unwrap().contains(&Value::from("luna")));
    }

    #[tokio::test]
    async fn test_handler_requires_text_argument() {
        let Tool::Function(tool) = generate_audio_tool(synthesizer(), "alloy") else {
            panic!("expected function tool");
        };
        let err = (tool.handler)(json!({"voice_type": "luna"})).await.unwrap_err();
        assert!(err.to_string().contains("text"));
    }
}
