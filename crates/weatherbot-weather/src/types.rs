use serde::Deserialize;

/// Reply used whenever weather data cannot be obtained
pub const WEATHER_UNAVAILABLE: &str = "Sorry, I couldn't retrieve the weather data.";

/// Current conditions for a city
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Degrees Celsius
    pub temperature: f64,
    pub description: String,
}

/// Body of a Weatherstack `/current` response.
///
/// Weatherstack reports failures with HTTP 200 and an `error` object, so
/// every field is optional here.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherstackResponse {
    #[serde(default)]
    pub error: Option<WeatherstackApiError>,
    #[serde(default)]
    pub current: Option<WeatherstackCurrent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherstackCurrent {
    pub temperature: f64,
    #[serde(default)]
    pub weather_descriptions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherstackApiError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

impl WeatherstackResponse {
    pub fn into_conditions(self) -> Result<CurrentConditions, WeatherError> {
        let Some(current) = self.current else {
            return Err(match self.error {
                Some(err) => WeatherError::Api {
                    code: err.code,
                    info: err
                        .info
                        .or(err.kind)
                        .unwrap_or_else(|| "unknown error".to_string()),
                },
                None => WeatherError::MissingCurrent,
            });
        };

        let description = current
            .weather_descriptions
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Parse("no weather description".to_string()))?;

        Ok(CurrentConditions {
            temperature: current.temperature,
            description,
        })
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API returned status {0}")]
    Status(u16),
    #[error("Weather API error {code:?}: {info}")]
    Api { code: Option<i64>, info: String },
    #[error("Response has no current conditions")]
    MissingCurrent,
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("No weather API access key configured")]
    MissingAccessKey,
    #[error("Invalid weather API URL: {0}")]
    InvalidUrl(String),
}
