//! Zero-shot intent classification via the Hugging Face Inference API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use weatherbot_core::{ClassifierConfig, ClassifierError, ReqwestErrorExt};

/// Labels offered to the classifier, in the order they are sent
pub const CANDIDATE_LABELS: [&str; 3] = ["forecast_weather", "current_weather", "other"];

/// Coarse category of a user query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ForecastWeather,
    CurrentWeather,
    Other,
}

impl Intent {
    /// Classifier label for this intent
    pub fn label(&self) -> &'static str {
        match self {
            Self::ForecastWeather => "forecast_weather",
            Self::CurrentWeather => "current_weather",
            Self::Other => "other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "forecast_weather" => Some(Self::ForecastWeather),
            "current_weather" => Some(Self::CurrentWeather),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn is_weather(&self) -> bool {
        matches!(self, Self::ForecastWeather | Self::CurrentWeather)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Top-ranked intent and the classifier's score for it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentPrediction {
    pub intent: Intent,
    pub score: f64,
}

/// Something that can guess the intent of a free-text query.
///
/// The server holds a single instance for its whole lifetime.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<IntentPrediction, ClassifierError>;
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

/// Zero-shot classification response body
#[derive(Debug, Clone, Deserialize)]
pub struct ZeroShotResponse {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ZeroShotResponse {
    /// Pick the highest-scoring label. Ties go to the label listed first.
    pub fn top_prediction(&self) -> Result<IntentPrediction, ClassifierError> {
        if self.labels.len() != self.scores.len() {
            return Err(ClassifierError::InvalidResponse(format!(
                "{} labels but {} scores",
                self.labels.len(),
                self.scores.len()
            )));
        }

        let (label, score) = self
            .labels
            .iter()
            .zip(self.scores.iter().copied())
            .fold(None::<(&String, f64)>, |best, (label, score)| match best {
                Some((_, best_score)) if score <= best_score => best,
                _ => Some((label, score)),
            })
            .ok_or_else(|| ClassifierError::InvalidResponse("no labels returned".to_string()))?;

        let intent =
            Intent::from_label(label).ok_or_else(|| ClassifierError::UnknownLabel(label.clone()))?;

        Ok(IntentPrediction { intent, score })
    }
}

/// Error body returned by the inference API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Classifier backed by a hosted zero-shot model
#[derive(Debug, Clone)]
pub struct HuggingFaceClassifier {
    client: Arc<Client>,
    endpoint: Url,
    api_token: Option<String>,
}

impl HuggingFaceClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let endpoint = format!(
            "{}/models/{}",
            config.api_url.trim_end_matches('/'),
            config.model
        );
        let endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Invalid classifier endpoint: {}", endpoint))?;

        Ok(Self {
            client: Arc::new(client),
            endpoint,
            api_token: config.api_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl IntentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<IntentPrediction, ClassifierError> {
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: &CANDIDATE_LABELS,
            },
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.api_token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            let message = api_error_message(&response.text().await.unwrap_or_default());
            tracing::warn!("Classifier returned {}: {}", status, message);

            if status == StatusCode::SERVICE_UNAVAILABLE {
                return Err(ClassifierError::ModelUnavailable(message));
            }
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ZeroShotResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        let prediction = body.top_prediction()?;
        tracing::debug!(
            intent = %prediction.intent,
            score = prediction.score,
            "Classified query"
        );

        Ok(prediction)
    }
}
