use crate::core::poll::{BoundedPoll, PollOutcome, PollStep};
use crate::domain::inference::{FarmData, PredictionResult, SoilData};
use crate::domain::ports::PredictionApi;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";
pub const DEFAULT_MODEL_VERSION: &str = "mistralai/mixtral-8x7b-instruct-v0.1:cf18decbf51c27fed6bbdc3492312c1c903222a56e3fe9ca02d6cbe5198afc10";

/// 推論服務連線設定。API token 由呼叫端提供。
#[derive(Clone)]
pub struct InferenceSettings {
    pub base_url: String,
    pub api_token: String,
    pub model_version: String,
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub poll: BoundedPoll,
}

impl InferenceSettings {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: api_token.into(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            max_new_tokens: 512,
            temperature: 0.7,
            poll: BoundedPoll::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll = BoundedPoll::new(interval, max_attempts);
        self
    }
}

impl fmt::Debug for InferenceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceSettings")
            .field("base_url", &self.base_url)
            .field("api_token", &"***")
            .field("model_version", &self.model_version)
            .field("max_new_tokens", &self.max_new_tokens)
            .field("temperature", &self.temperature)
            .field("poll", &self.poll)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CreatedPrediction {
    id: String,
}

/// Client for a create-then-poll prediction API.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    settings: InferenceSettings,
    client: Client,
}

impl PredictionClient {
    pub fn new(settings: InferenceSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
        }
    }

    pub fn settings(&self) -> &InferenceSettings {
        &self.settings
    }

    fn authorization(&self) -> String {
        format!("Token {}", self.settings.api_token)
    }

    /// 建立預測並回傳其 id
    pub async fn create_prediction(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/predictions", self.settings.base_url);
        let body = json!({
            "version": self.settings.model_version,
            "input": {
                "prompt": prompt,
                "max_new_tokens": self.settings.max_new_tokens,
                "temperature": self.settings.temperature,
            }
        });

        tracing::debug!("Creating prediction at: {}", url);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.authorization())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let created: CreatedPrediction = response.json().await?;
        tracing::debug!("Prediction created: {}", created.id);
        Ok(created.id)
    }

    async fn fetch_status(&self, prediction_id: &str) -> Result<PollStep<Value>> {
        let url = format!("{}/predictions/{}", self.settings.base_url, prediction_id);
        let prediction: Value = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.authorization())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let status = prediction.get("status").and_then(Value::as_str).unwrap_or("");
        tracing::debug!("Prediction {} status: {}", prediction_id, status);
        let terminal = matches!(status, "succeeded" | "failed" | "canceled");

        if terminal {
            Ok(PollStep::Ready(prediction))
        } else {
            Ok(PollStep::Pending)
        }
    }

    /// Polls until the prediction reaches a terminal status or the budget runs out.
    pub async fn get_prediction_result(&self, prediction_id: &str) -> PredictionResult {
        let outcome = self
            .settings
            .poll
            .run(move |_| self.fetch_status(prediction_id))
            .await;

        match outcome {
            Ok(PollOutcome::Completed { value, .. }) => {
                if value.get("status").and_then(Value::as_str) == Some("succeeded") {
                    let text = joined_output(value.get("output"));
                    PredictionResult::succeeded(text, value)
                } else {
                    tracing::warn!("Prediction {} did not succeed", prediction_id);
                    PredictionResult::failed("Prediction failed")
                }
            }
            Ok(PollOutcome::Exhausted { attempts }) => {
                tracing::warn!(
                    "Prediction {} timed out after {} attempts",
                    prediction_id,
                    attempts
                );
                PredictionResult::failed("Prediction timed out")
            }
            Err(e) => {
                tracing::error!("Error getting prediction result: {}", e);
                PredictionResult::failed("Failed to get prediction result")
            }
        }
    }

    async fn run_prompt(&self, prompt: &str, failure: &str) -> PredictionResult {
        match self.create_prediction(prompt).await {
            Ok(id) => self.get_prediction_result(&id).await,
            Err(e) => {
                tracing::error!("{}: {}", failure, e);
                PredictionResult::failed(failure)
            }
        }
    }
}

#[async_trait]
impl PredictionApi for PredictionClient {
    async fn analyze_soil(&self, soil: &SoilData) -> PredictionResult {
        tracing::info!("🧪 Requesting soil analysis for {} {}", soil.area, soil.unit);
        self.run_prompt(&soil.prompt(), "Failed to analyze soil data")
            .await
    }

    async fn predict_yield(&self, farm: &FarmData) -> PredictionResult {
        tracing::info!("🌾 Requesting yield prediction for {} {}", farm.area, farm.unit);
        self.run_prompt(&farm.prompt(), "Failed to predict yield").await
    }
}

/// 模型輸出可能是字串陣列或單一字串
fn joined_output(output: Option<&Value>) -> String {
    match output {
        Some(Value::Array(parts)) => parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
