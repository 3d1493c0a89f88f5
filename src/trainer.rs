use crate::artifact::{ArtifactMetadata, ModelArtifact, SCHEMA_VERSION};
use crate::classifier::{balanced_class_weights, Classifier, LogisticRegression, Penalty};
use crate::dataset::TrainingRecord;
use crate::error::{validation_error, AppError};
use crate::eval::{f1_score, ClassificationReport};
use crate::preprocess::clean_text;
use crate::vectorizer::TfidfVectorizer;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::info;

const MAX_FEATURES: usize = 5000;
const TEST_FRACTION: f64 = 0.2;
const CV_FOLDS: usize = 3;
const SPLIT_SEED: u64 = 42;

const NGRAM_GRID: [(usize, usize); 2] = [(1, 1), (1, 2)];
const C_GRID: [f64; 3] = [0.1, 1.0, 10.0];
const PENALTY_GRID: [Penalty; 2] = [Penalty::L1, Penalty::L2];

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HyperParams {
    pub ngram_range: (usize, usize),
    pub c: f64,
    pub penalty: Penalty,
}

impl fmt::Display for HyperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let penalty = match self.penalty {
            Penalty::L1 => "l1",
            Penalty::L2 => "l2",
        };
        write!(
            f,
            "ngram_range=({},{}) C={} penalty={}",
            self.ngram_range.0, self.ngram_range.1, self.c, penalty
        )
    }
}

#[derive(Debug)]
pub struct TrainOutcome {
    pub artifact: ModelArtifact,
    pub report: ClassificationReport,
}

pub fn train(records: &[TrainingRecord]) -> Result<TrainOutcome, AppError> {
    if records.is_empty() {
        return Err(validation_error("training corpus is empty"));
    }

    let docs: Vec<String> = records.iter().map(|r| clean_text(&r.text)).collect();
    let labels: Vec<bool> = records.iter().map(|r| r.label).collect();

    let positives = labels.iter().filter(|&&l| l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(validation_error(
            "training corpus must contain both fraudulent and legitimate examples",
        ));
    }
    info!(
        "Training on {} records ({} fraudulent, {} legitimate)",
        labels.len(),
        positives,
        negatives
    );

    let (train_idx, test_idx) = stratified_split(&labels, TEST_FRACTION, SPLIT_SEED);
    let train_docs: Vec<String> = train_idx.iter().map(|&i| docs[i].clone()).collect();
    let train_labels: Vec<bool> = train_idx.iter().map(|&i| labels[i]).collect();

    let train_positives = train_labels.iter().filter(|&&l| l).count();
    let train_negatives = train_labels.len() - train_positives;
    if train_positives.min(train_negatives) < CV_FOLDS {
        return Err(validation_error(&format!(
            "each class needs at least {} training examples for {}-fold cross-validation",
            CV_FOLDS, CV_FOLDS
        )));
    }

    // Grid search over the held-in split, scored by mean fraudulent-class
    // f1 across folds. Ties keep the earlier combination.
    let mut best_score = f64::NEG_INFINITY;
    let mut best_params = HyperParams {
        ngram_range: NGRAM_GRID[0],
        c: C_GRID[0],
        penalty: PENALTY_GRID[0],
    };
    for &ngram_range in &NGRAM_GRID {
        for &c in &C_GRID {
            for &penalty in &PENALTY_GRID {
                let params = HyperParams {
                    ngram_range,
                    c,
                    penalty,
                };
                let score = cross_validate(&train_docs, &train_labels, params, CV_FOLDS);
                info!("CV f1 {:.4} for {}", score, params);
                if score > best_score {
                    best_score = score;
                    best_params = params;
                }
            }
        }
    }
    info!("Best parameters: {} (CV f1 {:.4})", best_params, best_score);

    let (vectorizer, classifier) = fit_pipeline(&train_docs, &train_labels, best_params);

    let y_true: Vec<bool> = test_idx.iter().map(|&i| labels[i]).collect();
    let y_pred: Vec<bool> = test_idx
        .iter()
        .map(|&i| classifier.predict_label(&vectorizer.transform(&docs[i])))
        .collect();
    let report = ClassificationReport::compute(&y_true, &y_pred);
    info!("Held-out fraudulent-class f1 {:.4}", report.fraudulent.f1);

    let artifact = ModelArtifact {
        vectorizer,
        classifier,
        metadata: ArtifactMetadata {
            schema_version: SCHEMA_VERSION,
            trained_at: Utc::now(),
            params: best_params,
            metrics: report.clone(),
        },
    };

    Ok(TrainOutcome { artifact, report })
}

fn fit_pipeline(
    docs: &[String],
    labels: &[bool],
    params: HyperParams,
) -> (TfidfVectorizer, LogisticRegression) {
    let mut vectorizer = TfidfVectorizer::new(params.ngram_range, MAX_FEATURES);
    vectorizer.fit(docs);
    let rows: Vec<_> = docs.iter().map(|d| vectorizer.transform(d)).collect();

    let sample_weights = balanced_class_weights(labels);
    let mut classifier =
        LogisticRegression::new(vectorizer.vocabulary.len(), params.c, params.penalty);
    classifier.fit(&rows, labels, &sample_weights);

    (vectorizer, classifier)
}

fn cross_validate(docs: &[String], labels: &[bool], params: HyperParams, folds: usize) -> f64 {
    let fold_indices = stratified_kfold(labels, folds);

    let mut total = 0.0;
    for held_out in &fold_indices {
        let in_fold: HashSet<usize> = held_out.iter().copied().collect();
        let mut fold_docs = Vec::new();
        let mut fold_labels = Vec::new();
        for i in 0..docs.len() {
            if !in_fold.contains(&i) {
                fold_docs.push(docs[i].clone());
                fold_labels.push(labels[i]);
            }
        }

        // The vectorizer refits inside every fold so held-out documents
        // never contribute vocabulary or document frequencies.
        let (vectorizer, classifier) = fit_pipeline(&fold_docs, &fold_labels, params);

        let y_true: Vec<bool> = held_out.iter().map(|&i| labels[i]).collect();
        let y_pred: Vec<bool> = held_out
            .iter()
            .map(|&i| classifier.predict_label(&vectorizer.transform(&docs[i])))
            .collect();
        total += f1_score(&y_true, &y_pred);
    }

    total / folds as f64
}

fn stratified_split(labels: &[bool], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [true, false] {
        let mut indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        indices.shuffle(&mut rng);

        let n_test = (indices.len() as f64 * test_fraction).round() as usize;
        test.extend(indices.drain(..n_test));
        train.extend(indices);
    }

    (train, test)
}

fn stratified_kfold(labels: &[bool], folds: usize) -> Vec<Vec<usize>> {
    let mut fold_indices = vec![Vec::new(); folds];
    for class in [true, false] {
        let class_members = labels.iter().enumerate().filter(|(_, &l)| l == class);
        for (pos, (idx, _)) in class_members.enumerate() {
            fold_indices[pos % folds].push(idx);
        }
    }
    fold_indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_corpus() -> Vec<TrainingRecord> {
        let fraud_templates = [
            "wire transfer fee required before your interview",
            "send upfront payment to secure the position today",
            "guaranteed money fast no experience needed at all",
            "pay the registration fee upfront for training kit",
            "urgent hire send payment for background check now",
        ];
        let legit_templates = [
            "senior software engineer building distributed storage",
            "backend developer joining our platform engineering team",
            "product designer collaborating with research and engineering",
            "data analyst supporting the customer success organization",
            "site reliability engineer maintaining production infrastructure",
        ];

        // Imbalanced on purpose: 15 fraudulent vs 25 legitimate records.
        let mut records = Vec::new();
        for round in 0..3 {
            for (i, text) in fraud_templates.iter().enumerate() {
                records.push(TrainingRecord {
                    text: format!("{} ref{}{}", text, round, i),
                    label: true,
                });
            }
        }
        for round in 0..5 {
            for (i, text) in legit_templates.iter().enumerate() {
                records.push(TrainingRecord {
                    text: format!("{} job{}{}", text, round, i),
                    label: false,
                });
            }
        }
        records
    }

    #[test]
    fn test_stratified_split_preserves_class_ratio() {
        let labels: Vec<bool> = (0..60).map(|i| i < 20).collect();
        let (train, test) = stratified_split(&labels, 0.2, 42);

        let test_pos = test.iter().filter(|&&i| labels[i]).count();
        let test_neg = test.len() - test_pos;
        assert_eq!(test_pos, 4);
        assert_eq!(test_neg, 8);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..60).collect::<Vec<_>>());
    }

    #[test]
    fn test_stratified_split_is_deterministic() {
        let labels: Vec<bool> = (0..30).map(|i| i % 3 == 0).collect();
        let first = stratified_split(&labels, 0.2, 42);
        let second = stratified_split(&labels, 0.2, 42);
        assert_eq!(first, second);
    }

    #[test]
    fn test_stratified_kfold_partitions_every_index_once() {
        let labels: Vec<bool> = (0..10).map(|i| i % 2 == 0).collect();
        let folds = stratified_kfold(&labels, 3);

        assert_eq!(folds.len(), 3);
        let mut all: Vec<usize> = folds.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        for fold in &folds {
            assert!(fold.iter().any(|&i| labels[i]));
            assert!(fold.iter().any(|&i| !labels[i]));
        }
    }

    #[test]
    fn test_train_end_to_end_produces_serving_ready_artifact() {
        let records = synthetic_corpus();
        let outcome = train(&records).unwrap();

        assert_eq!(outcome.artifact.metadata.schema_version, SCHEMA_VERSION);
        let n = outcome.artifact.vectorizer.vocabulary.len();
        assert_eq!(outcome.artifact.classifier.weights.len(), n);
        assert_eq!(outcome.artifact.vectorizer.idf.len(), n);

        // 20% of each class is held out: 3 of 15 fraudulent, 5 of 25 legitimate
        assert_eq!(outcome.report.fraudulent.support, 3);
        assert_eq!(outcome.report.legitimate.support, 5);
        assert!(outcome.report.fraudulent.f1 >= 0.9);

        let fraud = outcome
            .artifact
            .vectorizer
            .transform("wire transfer fee upfront payment required");
        assert!(outcome.artifact.classifier.predict_label(&fraud));

        let legit = outcome
            .artifact
            .vectorizer
            .transform("software engineer joining the storage team");
        assert!(!outcome.artifact.classifier.predict_label(&legit));
    }

    #[test]
    fn test_train_rejects_empty_corpus() {
        let err = train(&[]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_train_rejects_single_class_corpus() {
        let records: Vec<TrainingRecord> = (0..10)
            .map(|i| TrainingRecord {
                text: format!("legitimate posting number {} for the engineering team", i),
                label: false,
            })
            .collect();
        let err = train(&records).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_hyper_params_display() {
        let params = HyperParams {
            ngram_range: (1, 2),
            c: 0.1,
            penalty: Penalty::L1,
        };
        assert_eq!(params.to_string(), "ngram_range=(1,2) C=0.1 penalty=l1");
    }
}
