//! HTTP-level tests for the weatherbot routes.
//!
//! The classifier is replaced by an in-process stub and the weather API by a
//! wiremock server, so these run without network access.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use warp::http::StatusCode;
use weatherbot_core::{ClassifierError, NetworkError, WeatherConfig};
use weatherbot_nlu::{EntityExtractor, Intent, IntentClassifier, IntentPrediction};
use weatherbot_server::{ChatService, CITY_CLARIFICATION, OFF_TOPIC};
use weatherbot_weather::{WeatherProvider, WEATHER_UNAVAILABLE};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers weather intents for anything mentioning weather or forecasts
struct KeywordClassifier;

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<IntentPrediction, ClassifierError> {
        let lowered = text.to_lowercase();
        let intent = if lowered.contains("forecast") {
            Intent::ForecastWeather
        } else if lowered.contains("weather") {
            Intent::CurrentWeather
        } else {
            Intent::Other
        };
        Ok(IntentPrediction { intent, score: 0.8 })
    }
}

struct DownClassifier;

#[async_trait]
impl IntentClassifier for DownClassifier {
    async fn classify(&self, _text: &str) -> Result<IntentPrediction, ClassifierError> {
        Err(ClassifierError::Network(NetworkError::Timeout))
    }
}

fn service(classifier: impl IntentClassifier + 'static, server: &MockServer) -> Arc<ChatService> {
    let weather = WeatherProvider::new(&WeatherConfig {
        api_url: server.uri(),
        access_key: Some("test-key".to_string()),
        ..WeatherConfig::default()
    })
    .unwrap();
    Arc::new(ChatService::new(
        Arc::new(classifier),
        EntityExtractor::new().unwrap(),
        weather,
    ))
}

async fn chat(service: Arc<ChatService>, query: &str) -> (StatusCode, serde_json::Value) {
    let filter = weatherbot_server::routes(service);
    let res = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&serde_json::json!({ "query": query }))
        .reply(&filter)
        .await;

    let body = serde_json::from_slice(res.body()).unwrap();
    (res.status(), body)
}

#[tokio::test]
async fn test_root_greeting() {
    let server = MockServer::start().await;
    let filter = weatherbot_server::routes(service(KeywordClassifier, &server));

    let res = warp::test::request().method("GET").path("/").reply(&filter).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body, serde_json::json!({ "Hello": "World" }));
}

#[tokio::test]
async fn test_chat_forecast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current"))
        .and(query_param("query", "Moscow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": { "temperature": -2, "weather_descriptions": ["Overcast"] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = chat(
        service(KeywordClassifier, &server),
        "What is the forecast for Moscow 2024-12-15?",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"],
        "The weather forecast for Moscow on 2024-12-15 is -2°C with Overcast."
    );
}

#[tokio::test]
async fn test_chat_current_weather() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current"))
        .and(query_param("query", "Tunis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": { "temperature": 24, "weather_descriptions": ["Sunny"] }
        })))
        .mount(&server)
        .await;

    let (status, body) = chat(service(KeywordClassifier, &server), "Weather in tunis?").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({ "response": "The current temperature in Tunis is 24°C with Sunny." })
    );
}

#[tokio::test]
async fn test_chat_missing_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = chat(
        service(KeywordClassifier, &server),
        "What's the weather in Berlin?",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], CITY_CLARIFICATION);
}

#[tokio::test]
async fn test_chat_off_topic() {
    let server = MockServer::start().await;

    let (status, body) = chat(service(KeywordClassifier, &server), "Tell me a joke").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], OFF_TOPIC);
}

#[tokio::test]
async fn test_chat_weather_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (status, body) = chat(service(KeywordClassifier, &server), "Weather in Paris").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], WEATHER_UNAVAILABLE);
}

#[tokio::test]
async fn test_chat_classifier_down() {
    let server = MockServer::start().await;

    let (status, body) = chat(service(DownClassifier, &server), "Weather in Paris").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "classifier_failed");
}

#[tokio::test]
async fn test_chat_invalid_body() {
    let server = MockServer::start().await;
    let filter = weatherbot_server::routes(service(KeywordClassifier, &server));

    let res = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&serde_json::json!({ "question": "Weather in Paris" }))
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["code"], "invalid_body");
}

#[tokio::test]
async fn test_unknown_route() {
    let server = MockServer::start().await;
    let filter = weatherbot_server::routes(service(KeywordClassifier, &server));

    let res = warp::test::request()
        .method("GET")
        .path("/nope")
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight() {
    let server = MockServer::start().await;
    let filter = weatherbot_server::routes(service(KeywordClassifier, &server));

    let res = warp::test::request()
        .method("OPTIONS")
        .path("/chat")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_chat_chunked_body() {
    let server = MockServer::start().await;
    let filter = weatherbot_server::routes(service(KeywordClassifier, &server));
    let (addr, running) = warp::serve(filter).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(running);

    // No Content-Length: the body arrives as a single chunk
    let body = r#"{"query":"Tell me a joke"}"#;
    let request = format!(
        "POST /chat HTTP/1.1\r\n\
         Host: localhost\r\n\
         Content-Type: application/json\r\n\
         Transfer-Encoding: chunked\r\n\
         Connection: close\r\n\
         \r\n\
         {:x}\r\n{}\r\n0\r\n\r\n",
        body.len(),
        body
    );

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8_lossy(&raw);

    assert!(raw.starts_with("HTTP/1.1 200"), "unexpected reply: {}", raw);
    assert!(raw.contains(OFF_TOPIC));
}

#[tokio::test]
async fn test_chat_body_too_large() {
    let server = MockServer::start().await;
    let filter = weatherbot_server::routes(service(KeywordClassifier, &server));

    let res = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&serde_json::json!({ "query": "a".repeat(20 * 1024) }))
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["code"], "payload_too_large");
}

#[tokio::test]
async fn test_error_reply_carries_cors_headers() {
    let server = MockServer::start().await;
    let filter = weatherbot_server::routes(service(KeywordClassifier, &server));

    let res = warp::test::request()
        .method("POST")
        .path("/chat")
        .header("origin", "http://localhost:3000")
        .json(&serde_json::json!({ "question": 1 }))
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_disallowed_header() {
    let server = MockServer::start().await;
    let filter = weatherbot_server::routes(service(KeywordClassifier, &server));

    let res = warp::test::request()
        .method("OPTIONS")
        .path("/chat")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "x-custom")
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["code"], "cors_forbidden");
}
