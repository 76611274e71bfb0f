//! HTTP routes.
//!
//! - `GET /`      static greeting
//! - `POST /chat` `{"query": "..."}` -> `{"response": "..."}`

use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::chat::{ChatRequest, ChatResponse, ChatService};

/// Largest accepted `/chat` body
const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Error body returned for failed requests
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
struct BodyTooLarge;

impl Reject for BodyTooLarge {}

#[derive(Debug)]
struct InvalidBody(String);

impl Reject for InvalidBody {}

fn error_reply(status: StatusCode, error: impl Into<String>, code: &str) -> Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
        status,
    )
    .into_response()
}

/// All routes with CORS, rejection handling and request tracing applied.
///
/// CORS allows any origin but only the `content-type`, `accept` and
/// `authorization` request headers: warp has no wildcard for allowed
/// headers, so a preflight asking for anything else is refused with 403.
pub fn routes(
    service: Arc<ChatService>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let root = warp::get()
        .and(warp::path::end())
        .map(|| warp::reply::json(&serde_json::json!({ "Hello": "World" })));

    let chat = warp::post()
        .and(warp::path("chat"))
        .and(warp::path::end())
        .and(chat_body())
        .and(with_service(service))
        .and_then(chat_handler);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type", "accept", "authorization"]);

    // Error replies are produced inside the CORS wrapper so they carry its
    // headers; the outer recover only sees CORS rejections.
    root.or(chat)
        .recover(handle_rejection)
        .with(cors)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

fn with_service(
    service: Arc<ChatService>,
) -> impl Filter<Extract = (Arc<ChatService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// JSON `/chat` body, with or without a `Content-Length` header.
///
/// A declared length over the cap is refused before reading; chunked bodies
/// are checked once buffered.
fn chat_body() -> impl Filter<Extract = (ChatRequest,), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and_then(|declared: Option<u64>| async move {
            match declared {
                Some(len) if len > MAX_BODY_BYTES => Err(warp::reject::custom(BodyTooLarge)),
                _ => Ok(()),
            }
        })
        .untuple_one()
        .and(warp::body::bytes())
        .and_then(|body| async move { parse_chat_body(body) })
}

fn parse_chat_body(body: impl AsRef<[u8]>) -> Result<ChatRequest, Rejection> {
    let body = body.as_ref();
    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(warp::reject::custom(BodyTooLarge));
    }

    serde_json::from_slice(body).map_err(|e| warp::reject::custom(InvalidBody(e.to_string())))
}

async fn chat_handler(
    request: ChatRequest,
    service: Arc<ChatService>,
) -> Result<Response, Infallible> {
    match service.respond(&request.query).await {
        Ok(response) => Ok(warp::reply::json(&ChatResponse { response }).into_response()),
        Err(e) => {
            tracing::error!("Chat request failed: {}", e);
            Ok(error_reply(StatusCode::BAD_GATEWAY, e.user_message(), e.code()))
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not found", "not_found"));
    }

    if let Some(InvalidBody(message)) = err.find::<InvalidBody>() {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", message),
            "invalid_body",
        ));
    }

    if err.find::<BodyTooLarge>().is_some() {
        return Ok(error_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
            "payload_too_large",
        ));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
            "method_not_allowed",
        ));
    }

    if let Some(e) = err.find::<warp::cors::CorsForbidden>() {
        return Ok(error_reply(StatusCode::FORBIDDEN, e.to_string(), "cors_forbidden"));
    }

    tracing::error!("Unhandled rejection: {:?}", err);
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
        "internal_error",
    ))
}
