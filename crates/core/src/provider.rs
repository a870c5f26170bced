use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::{Config, GEMINI_KEY_VAR, GENERATION_TIMEOUT},
    error::{Result, ScriptwrightError},
    sanitize::truncate_chars,
};

/// Characters of a failed response kept in the error.
const ERROR_BODY_CHARS: usize = 400;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    /// Low temperature, short output: the intermediate bullet analysis.
    pub const ANALYSIS: Self = Self {
        temperature: 0.2,
        max_output_tokens: 800,
    };

    /// Higher temperature, long output: the narration script.
    pub const SCRIPT: Self = Self {
        temperature: 0.75,
        max_output_tokens: 9000,
    };
}

/// A text generation backend.
///
/// Expected API failures come back as errors rather than panics. A missing
/// credential is reported as [`ScriptwrightError::MissingApiKey`] before any
/// request is made.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(GENERATION_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            api_base: config.endpoints.gemini_api.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ScriptwrightError::MissingApiKey {
                env_var: GEMINI_KEY_VAR.to_string(),
            })?;

        debug!(
            model = %self.model,
            temperature = params.temperature,
            max_output_tokens = params.max_output_tokens,
            prompt_chars = prompt.chars().count(),
            "sending generation request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "temperature": params.temperature,
                "maxOutputTokens": params.max_output_tokens,
                "contents": [
                    {
                        "type": "text",
                        "text": prompt,
                    },
                ],
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScriptwrightError::ModelApi {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_CHARS).to_string(),
            });
        }

        let body = response.json::<Value>().await?;
        extract_text(&body)
    }
}

/// First text part of the first candidate.
pub fn extract_text(body: &Value) -> Result<String> {
    body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            let dump = body.to_string();
            ScriptwrightError::UnexpectedResponse {
                dump: truncate_chars(&dump, ERROR_BODY_CHARS).to_string(),
            }
        })
}
