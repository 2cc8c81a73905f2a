//! Networked interpreter backed by the Gemini `generateContent` REST API.

use std::time::Duration;

use eyre::WrapErr;
use ninja_core::interpreter::{answer_prompt, command_prompt};
use ninja_core::{CommandInterpreter, Interpretation, parse_action_json};
use serde::{Deserialize, Serialize};

const COMMAND_TEMPERATURE: f32 = 0.2;
const ANSWER_TEMPERATURE: f32 = 0.7;

pub struct GeminiInterpreter {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl core::fmt::Debug for GeminiInterpreter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeminiInterpreter")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiInterpreter {
    /// Build a client; the API key is read from the env var named in config.
    pub fn from_config(cfg: &ninja_config::Interpreter) -> eyre::Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).map_err(|_| {
            eyre::eyre!(
                "environment variable {} is not set (needed by the gemini interpreter)",
                cfg.api_key_env
            )
        })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .wrap_err("build gemini http client")?;
        Ok(Self {
            client,
            api_key,
            model: cfg.model.clone(),
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }

    fn complete(&self, prompt: String, temperature: f32) -> Result<String, String> {
        let body = GeminiRequest::user(prompt, temperature);
        let started = std::time::Instant::now();
        let response = self
            .client
            .post(self.url())
            .json(&body)
            .send()
            .map_err(|e| format!("gemini request failed: {}", e.without_url()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| format!("gemini response unreadable: {}", e.without_url()))?;
        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "gemini replied"
        );
        if !status.is_success() {
            // Error bodies usually carry a readable message; fall back to the status.
            return Err(extract_text(&text)
                .err()
                .unwrap_or_else(|| format!("gemini HTTP {status}")));
        }
        extract_text(&text)
    }
}

impl CommandInterpreter for GeminiInterpreter {
    fn interpret(&self, text: &str, is_command: bool) -> Interpretation {
        if is_command {
            match self.complete(command_prompt(text), COMMAND_TEMPERATURE) {
                Ok(reply) => match parse_action_json(&reply) {
                    Ok(action) => Interpretation::Action(action),
                    Err(e) => Interpretation::Error(e.to_string()),
                },
                Err(e) => Interpretation::Error(e),
            }
        } else {
            match self.complete(answer_prompt(text), ANSWER_TEMPERATURE) {
                Ok(reply) => Interpretation::Answer(reply.trim().to_string()),
                Err(e) => Interpretation::Error(e),
            }
        }
    }
}

// ── wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

impl GeminiRequest {
    fn user(text: String, temperature: f32) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text }],
            }],
            generation_config: GenerationConfig { temperature },
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull the first candidate's text out of a response body.
fn extract_text(body: &str) -> Result<String, String> {
    let parsed: GeminiResponse =
        serde_json::from_str(body).map_err(|e| format!("gemini response is not JSON: {e}"))?;
    if let Some(err) = parsed.error {
        return Err(format!("gemini API error: {}", err.message));
    }
    parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| "gemini returned no content".to_string())
}
