//! Weather lookup for weatherbot
//!
//! Fetches current conditions from the Weatherstack API and renders them as
//! a one-sentence reply.

pub mod provider;
pub mod types;

pub use provider::{format_report, WeatherProvider};
pub use types::*;
