use crate::classifier::LogisticRegression;
use crate::error::AppError;
use crate::eval::ClassificationReport;
use crate::trainer::HyperParams;
use crate::vectorizer::TfidfVectorizer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

// Bump when the serialized layout changes; load refuses anything else.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub schema_version: u32,
    pub trained_at: DateTime<Utc>,
    pub params: HyperParams,
    pub metrics: ClassificationReport,
}

// The trained pipeline persisted as a single JSON bundle: fitted
// vectorizer, fitted classifier, and training metadata. Loaded once at
// startup and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub vectorizer: TfidfVectorizer,
    pub classifier: LogisticRegression,
    pub metadata: ArtifactMetadata,
}

impl ModelArtifact {
    pub fn load(path: &str) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::ArtifactLoad(format!("failed to read {}: {}", path, e)))?;
        let artifact: ModelArtifact = serde_json::from_str(&content)
            .map_err(|e| AppError::ArtifactLoad(format!("failed to parse {}: {}", path, e)))?;
        artifact.validate(path)?;

        info!(
            "Loaded model artifact from {} ({} features, trained {})",
            path,
            artifact.vectorizer.vocabulary.len(),
            artifact.metadata.trained_at.to_rfc3339()
        );
        Ok(artifact)
    }

    pub fn save(&self, path: &str) -> Result<(), AppError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved model artifact to {}", path);
        Ok(())
    }

    // The vectorizer and classifier must agree on the feature space;
    // serving with a mismatched pair would score garbage.
    fn validate(&self, path: &str) -> Result<(), AppError> {
        let n = self.vectorizer.vocabulary.len();

        if self.metadata.schema_version != SCHEMA_VERSION {
            return Err(AppError::ArtifactLoad(format!(
                "{}: unsupported schema version {} (expected {})",
                path, self.metadata.schema_version, SCHEMA_VERSION
            )));
        }
        if self.classifier.weights.len() != n {
            return Err(AppError::ArtifactLoad(format!(
                "{}: classifier has {} weights for a vocabulary of {} terms",
                path,
                self.classifier.weights.len(),
                n
            )));
        }
        if self.vectorizer.idf.len() != n {
            return Err(AppError::ArtifactLoad(format!(
                "{}: vectorizer has {} idf values for a vocabulary of {} terms",
                path,
                self.vectorizer.idf.len(),
                n
            )));
        }
        if self.vectorizer.vocabulary.values().any(|&idx| idx >= n) {
            return Err(AppError::ArtifactLoad(format!(
                "{}: vocabulary contains an out-of-range feature index",
                path
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{balanced_class_weights, Classifier, Penalty};
    use crate::trainer::HyperParams;

    fn small_artifact() -> ModelArtifact {
        let docs = vec![
            "wire transfer fee required".to_string(),
            "quality software engineering team".to_string(),
        ];
        let labels = vec![true, false];

        let mut vectorizer = TfidfVectorizer::new((1, 1), 100);
        vectorizer.fit(&docs);
        let rows: Vec<_> = docs.iter().map(|d| vectorizer.transform(d)).collect();
        let weights = balanced_class_weights(&labels);
        let mut classifier =
            LogisticRegression::new(vectorizer.vocabulary.len(), 1.0, Penalty::L2);
        classifier.fit(&rows, &labels, &weights);

        let y_pred: Vec<bool> = rows.iter().map(|r| classifier.predict_label(r)).collect();
        let metrics = ClassificationReport::compute(&labels, &y_pred);

        ModelArtifact {
            vectorizer,
            classifier,
            metadata: ArtifactMetadata {
                schema_version: SCHEMA_VERSION,
                trained_at: Utc::now(),
                params: HyperParams {
                    ngram_range: (1, 1),
                    c: 1.0,
                    penalty: Penalty::L2,
                },
                metrics,
            },
        }
    }

    #[test]
    fn test_save_load_roundtrip_preserves_scoring() {
        let artifact = small_artifact();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let path = path.to_str().unwrap();

        artifact.save(path).unwrap();
        let loaded = ModelArtifact::load(path).unwrap();

        let text = "wire transfer fee required";
        let before = artifact.classifier.decision(&artifact.vectorizer.transform(text));
        let after = loaded.classifier.decision(&loaded.vectorizer.transform(text));
        assert_eq!(before, after);
        assert_eq!(loaded.metadata.schema_version, SCHEMA_VERSION);
        assert_eq!(loaded.vectorizer.vocabulary, artifact.vectorizer.vocabulary);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let artifact = small_artifact();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/output/model.json");

        artifact.save(path.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_missing_file_is_artifact_error() {
        let err = ModelArtifact::load("no/such/model.json").unwrap_err();
        assert!(matches!(err, AppError::ArtifactLoad(_)));
    }

    #[test]
    fn test_load_rejects_unknown_schema_version() {
        let mut artifact = small_artifact();
        artifact.metadata.schema_version = SCHEMA_VERSION + 1;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        artifact.save(path.to_str().unwrap()).unwrap();

        let err = ModelArtifact::load(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::ArtifactLoad(_)));
    }

    #[test]
    fn test_load_rejects_weight_vocabulary_mismatch() {
        let mut artifact = small_artifact();
        artifact.classifier.weights.pop();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        artifact.save(path.to_str().unwrap()).unwrap();

        let err = ModelArtifact::load(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::ArtifactLoad(_)));
    }

    #[test]
    fn test_load_rejects_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ModelArtifact::load(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::ArtifactLoad(_)));
    }
}
