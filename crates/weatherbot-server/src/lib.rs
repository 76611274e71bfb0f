//! HTTP front end for weatherbot
//!
//! `POST /chat` runs a query through intent classification, entity
//! extraction and weather lookup, and answers with a single sentence.

pub mod chat;
pub mod routes;

pub use chat::{ChatRequest, ChatResponse, ChatService, CITY_CLARIFICATION, OFF_TOPIC};
pub use routes::{routes, ErrorResponse};
