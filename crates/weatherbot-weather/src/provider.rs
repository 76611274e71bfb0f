use crate::types::{CurrentConditions, WeatherError, WeatherstackResponse, WEATHER_UNAVAILABLE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use weatherbot_core::WeatherConfig;

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    current_url: Url,
    access_key: Option<String>,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let current_url = format!("{}/current", config.api_url.trim_end_matches('/'));
        let current_url =
            Url::parse(&current_url).map_err(|e| WeatherError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            current_url,
            access_key: config
                .access_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
        })
    }

    /// Fetch current conditions for a city.
    pub async fn fetch_current(&self, city: &str) -> Result<CurrentConditions, WeatherError> {
        let access_key = self
            .access_key
            .as_deref()
            .ok_or(WeatherError::MissingAccessKey)?;

        tracing::debug!("Fetching current weather for {}", city);

        let response = self
            .client
            .get(self.current_url.clone())
            .query(&[("access_key", access_key), ("query", city)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: WeatherstackResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        body.into_conditions()
    }

    /// Look up the weather and phrase it as a reply.
    ///
    /// The date only changes the wording; current conditions are fetched
    /// either way. Failures become [`WEATHER_UNAVAILABLE`].
    pub async fn describe(&self, city: &str, date: Option<&str>) -> String {
        match self.fetch_current(city).await {
            Ok(conditions) => format_report(city, date, &conditions),
            Err(e) => {
                tracing::warn!("Weather lookup for {} failed: {}", city, e);
                WEATHER_UNAVAILABLE.to_string()
            }
        }
    }
}

/// Render conditions as a reply sentence
pub fn format_report(city: &str, date: Option<&str>, conditions: &CurrentConditions) -> String {
    let temperature = format_temperature(conditions.temperature);
    match date {
        Some(date) => format!(
            "The weather forecast for {} on {} is {}°C with {}.",
            city, date, temperature, conditions.description
        ),
        None => format!(
            "The current temperature in {} is {}°C with {}.",
            city, temperature, conditions.description
        ),
    }
}

/// Whole degrees print without a fractional part
fn format_temperature(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
