//! The chat pipeline: classify, extract, look up, reply.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use weatherbot_core::{AppError, Config};
use weatherbot_nlu::{EntityExtractor, HuggingFaceClassifier, IntentClassifier};
use weatherbot_weather::WeatherProvider;

/// Reply when the query is about weather but names no known city
pub const CITY_CLARIFICATION: &str =
    "Sorry, I couldn't understand the city. Could you please specify it?";

/// Reply when the query is not about weather
pub const OFF_TOPIC: &str = "I'm not sure how to help with that. Could you ask about the weather?";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Request-independent state shared by every chat request.
///
/// Clients are built once at startup and reused; nothing here is mutated
/// after construction.
pub struct ChatService {
    classifier: Arc<dyn IntentClassifier>,
    extractor: EntityExtractor,
    weather: WeatherProvider,
}

impl ChatService {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        extractor: EntityExtractor,
        weather: WeatherProvider,
    ) -> Self {
        Self {
            classifier,
            extractor,
            weather,
        }
    }

    /// Build the service with the hosted classifier and Weatherstack provider
    pub fn from_config(config: &Config) -> Result<Self> {
        let classifier = HuggingFaceClassifier::new(&config.classifier)?;
        tracing::info!("Intent classifier endpoint: {}", classifier.endpoint());

        let extractor = EntityExtractor::new().context("Failed to compile date pattern")?;
        let weather =
            WeatherProvider::new(&config.weather).context("Failed to create weather provider")?;

        Ok(Self::new(Arc::new(classifier), extractor, weather))
    }

    /// Answer a single query.
    ///
    /// Classifier failures are returned as errors; weather failures are
    /// already folded into the reply text.
    pub async fn respond(&self, query: &str) -> Result<String, AppError> {
        let prediction = self.classifier.classify(query).await?;
        tracing::info!(
            intent = %prediction.intent,
            score = prediction.score,
            "Query classified"
        );

        if !prediction.intent.is_weather() {
            return Ok(OFF_TOPIC.to_string());
        }

        let entities = self.extractor.extract(query);
        tracing::debug!(city = ?entities.city, date = ?entities.date, "Entities extracted");

        match entities.city {
            Some(city) => Ok(self.weather.describe(&city, entities.date.as_deref()).await),
            None => Ok(CITY_CLARIFICATION.to_string()),
        }
    }
}
