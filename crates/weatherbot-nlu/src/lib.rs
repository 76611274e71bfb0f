//! Query understanding for weatherbot
//!
//! Intent comes from a hosted zero-shot classifier; city and date are pulled
//! out of the raw text with a fixed city list and a regular expression.

pub mod entities;
pub mod intent;

pub use entities::{Entities, EntityExtractor, KNOWN_CITIES};
pub use intent::{
    HuggingFaceClassifier, Intent, IntentClassifier, IntentPrediction, ZeroShotResponse,
    CANDIDATE_LABELS,
};
