use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub description: Option<String>,
    pub text: Option<String>,
}

impl PredictRequest {
    // `description` wins whenever it is present and non-empty, even if
    // it is all whitespace; `text` is the fallback alias.
    pub fn input_text(&self) -> &str {
        let raw = match &self.description {
            Some(d) if !d.is_empty() => d.as_str(),
            _ => self.text.as_deref().unwrap_or(""),
        };
        raw.trim()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub fraudulent: bool,
    pub confidence: Option<f64>,
    pub cleaned_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub top_features: Map<String, Value>,
    pub note: String,
}
