use crate::{
    artifact::ModelArtifact,
    classifier::Classifier,
    config::Config,
    error::{validation_error, AppError},
    preprocess::clean_text,
    types::{ExplainResponse, PredictResponse},
    vectorizer::SparseVector,
};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use tracing::info;

const TOP_FEATURES: usize = 5;

const EXPLANATION_NOTE: &str = "Positive scores indicate features contributing to a fraudulent \
     prediction, while negative scores indicate features contributing to a non-fraudulent \
     prediction.";

pub struct FraudEngine {
    config: Config,
    artifact: ModelArtifact,
}

impl FraudEngine {
    pub fn new(config: Config) -> Result<Self, AppError> {
        info!("Initializing fraud engine...");

        let artifact = ModelArtifact::load(&config.model_path)?;

        info!("Fraud engine initialized successfully");

        Ok(Self { config, artifact })
    }

    pub fn from_artifact(config: Config, artifact: ModelArtifact) -> Self {
        Self { config, artifact }
    }

    pub fn predict(&self, raw: &str) -> Result<PredictResponse, AppError> {
        let capped = truncate_chars(raw, self.config.max_input_chars);
        let cleaned = clean_text(capped);

        if cleaned.chars().count() < self.config.min_cleaned_chars {
            return Err(validation_error("Description too short after cleaning"));
        }

        let vector = self.artifact.vectorizer.transform(&cleaned);
        self.check_feature_bounds(&vector)?;

        let score = self.artifact.classifier.decision(&vector);
        if !score.is_finite() {
            return Err(AppError::Inference(format!(
                "non-finite decision score {}",
                score
            )));
        }

        let fraudulent = self.artifact.classifier.predict_label(&vector);
        let confidence = self
            .artifact
            .classifier
            .predict_confidence(&vector)
            .map(round3);

        Ok(PredictResponse {
            fraudulent,
            confidence,
            cleaned_text: cleaned,
        })
    }

    pub fn explain(&self, raw: &str) -> Result<ExplainResponse, AppError> {
        let capped = truncate_chars(raw, self.config.max_input_chars);
        let cleaned = clean_text(capped);

        let vector = self.artifact.vectorizer.transform(&cleaned);
        self.check_feature_bounds(&vector)?;

        let names = self.artifact.vectorizer.feature_names();
        let mut contributions: Vec<(String, f64)> = vector
            .iter()
            .map(|&(idx, value)| {
                let score = self.artifact.classifier.weights[idx] * value;
                (names[idx].clone(), score)
            })
            .collect();

        // Highest signed contribution first: the strongest push toward
        // the fraudulent class leads, negative scores trail.
        contributions.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        contributions.truncate(TOP_FEATURES);

        let mut top_features = Map::new();
        for (name, score) in contributions {
            top_features.insert(name, Value::from(round3(score)));
        }

        Ok(ExplainResponse {
            top_features,
            note: EXPLANATION_NOTE.to_string(),
        })
    }

    // Helper methods

    fn check_feature_bounds(&self, vector: &SparseVector) -> Result<(), AppError> {
        // Indices are ascending, so the last entry is the largest.
        if let Some(&(max_index, _)) = vector.last() {
            let n = self.artifact.classifier.weights.len();
            if max_index >= n {
                return Err(AppError::Inference(format!(
                    "feature index {} out of range for {} model weights",
                    max_index, n
                )));
            }
        }
        Ok(())
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
