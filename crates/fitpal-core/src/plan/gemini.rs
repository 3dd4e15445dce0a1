//! Google Gemini backend for [`PlanGenerator`].
//!
//! Calls `models/{model}:generateContent` with a JSON response schema so the
//! model answers with a plan-shaped JSON object. The answer is still
//! validated downstream.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, instrument};

use super::generator::{GenerationError, PlanGenerator};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Response schema in Gemini's OpenAPI subset, mirroring the plan schema.
fn plan_response_schema() -> Value {
    let exercise = json!({
        "type": "OBJECT",
        "properties": {
            "name": {"type": "STRING"},
            "sets": {"type": "INTEGER"},
            "reps": {"type": "STRING", "description": "e.g. \"10-12\" or \"30s\"."},
            "rest_period_seconds": {"type": "INTEGER"},
            "duration_mins": {"type": "INTEGER"},
            "met_value": {"type": "NUMBER", "description": "MET intensity of the exercise."},
            "notes": {"type": "STRING", "nullable": true}
        },
        "required": ["name", "sets", "reps", "rest_period_seconds", "duration_mins", "met_value"]
    });
    let meal = json!({
        "type": "OBJECT",
        "properties": {
            "meal_type": {"type": "STRING", "enum": ["breakfast", "lunch", "dinner", "snack"]},
            "description": {"type": "STRING"},
            "calories": {"type": "INTEGER"},
            "protein_grams": {"type": "NUMBER"},
            "carbs_grams": {"type": "NUMBER"},
            "fats_grams": {"type": "NUMBER"},
            "portion_size": {"type": "STRING", "nullable": true}
        },
        "required": ["meal_type", "description", "calories", "protein_grams", "carbs_grams", "fats_grams"]
    });
    json!({
        "type": "OBJECT",
        "properties": {
            "workout_days": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "day_of_week": {"type": "INTEGER", "description": "1 for Monday, 7 for Sunday."},
                        "title": {"type": "STRING"},
                        "description": {"type": "STRING"},
                        "is_rest_day": {"type": "BOOLEAN"},
                        "exercises": {"type": "ARRAY", "items": exercise}
                    },
                    "required": ["day_of_week", "title", "description", "is_rest_day", "exercises"]
                }
            },
            "nutrition_days": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "day_of_week": {"type": "INTEGER", "description": "1 for Monday, 7 for Sunday."},
                        "target_calories": {"type": "INTEGER", "nullable": true},
                        "target_protein_grams": {"type": "INTEGER", "nullable": true},
                        "target_carbs_grams": {"type": "INTEGER", "nullable": true},
                        "target_fats_grams": {"type": "INTEGER", "nullable": true},
                        "target_water_litres": {"type": "NUMBER", "nullable": true},
                        "notes": {"type": "STRING", "nullable": true},
                        "meals": {"type": "ARRAY", "items": meal}
                    },
                    "required": ["day_of_week", "meals"]
                }
            }
        },
        "required": ["workout_days", "nutrition_days"]
    })
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

pub struct GeminiPlanGenerator {
    api_key: String,
    client: Client,
    model: String,
    base_url: String,
}

impl GeminiPlanGenerator {
    /// `client` is shared with the rest of the process; build it once at
    /// startup with the desired timeouts.
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client,
            model: DEFAULT_MODEL.to_owned(),
            base_url: API_BASE_URL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn map_api_error(status: u16, body: &str) -> GenerationError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_owned());
        GenerationError::Api { status, message }
    }

    fn extract_text(response: GenerateResponse) -> Result<String, GenerationError> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            Err(GenerationError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl PlanGenerator for GeminiPlanGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if self.api_key.is_empty() {
            return Err(GenerationError::NotConfigured("Gemini API key is empty".into()));
        }

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: plan_response_schema(),
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        };

        debug!(prompt_len = prompt.len(), "sending plan generation request");
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &text));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Transport(format!("unexpected response shape: {e}")))?;
        let plan_text = Self::extract_text(parsed)?;
        debug!(response_len = plan_text.len(), "plan generation response received");
        Ok(plan_text)
    }
}
