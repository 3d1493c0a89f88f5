use crate::vectorizer::SparseVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

const LEARNING_RATE: f64 = 0.5;
const MAX_EPOCHS: usize = 1000;
const TOLERANCE: f64 = 1e-6;

// A classifier produces a binary label; calibrated probabilities are an
// optional capability, so callers must handle their absence.
pub trait Classifier {
    fn predict_label(&self, features: &SparseVector) -> bool;

    fn predict_confidence(&self, _features: &SparseVector) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Penalty {
    L1,
    L2,
}

// Binary logistic regression fitted by full-batch gradient descent over
// weighted log-loss. The regularization strength follows the usual
// inverse convention: larger C means a weaker penalty. The bias term is
// never regularized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub c: f64,
    pub penalty: Penalty,
}

impl LogisticRegression {
    pub fn new(n_features: usize, c: f64, penalty: Penalty) -> Self {
        Self {
            weights: vec![0.0; n_features],
            bias: 0.0,
            c,
            penalty,
        }
    }

    pub fn fit(&mut self, rows: &[SparseVector], labels: &[bool], sample_weights: &[f64]) {
        let total_weight: f64 = sample_weights.iter().sum();
        if rows.is_empty() || total_weight <= 0.0 {
            return;
        }
        let lambda = 1.0 / (self.c * total_weight);

        let mut prev_loss = f64::INFINITY;
        for epoch in 0..MAX_EPOCHS {
            let mut grad = vec![0.0; self.weights.len()];
            let mut grad_bias = 0.0;

            for ((row, &label), &weight) in rows.iter().zip(labels).zip(sample_weights) {
                let p = sigmoid(self.decision(row));
                let y = if label { 1.0 } else { 0.0 };
                let err = weight * (p - y);
                for &(idx, value) in row {
                    grad[idx] += err * value;
                }
                grad_bias += err;
            }

            match self.penalty {
                Penalty::L2 => {
                    for (w, g) in self.weights.iter_mut().zip(&grad) {
                        *w -= LEARNING_RATE * (g / total_weight + lambda * *w);
                    }
                }
                Penalty::L1 => {
                    // Gradient step, then a soft-threshold proximal step;
                    // weights with no signal land on exactly zero
                    let shrink = LEARNING_RATE * lambda;
                    for (w, g) in self.weights.iter_mut().zip(&grad) {
                        let stepped = *w - LEARNING_RATE * g / total_weight;
                        *w = stepped.signum() * (stepped.abs() - shrink).max(0.0);
                    }
                }
            }
            self.bias -= LEARNING_RATE * grad_bias / total_weight;

            let loss = self.loss(rows, labels, sample_weights, lambda);
            if (prev_loss - loss).abs() < TOLERANCE {
                debug!("fit converged after {} epochs (loss {:.6})", epoch + 1, loss);
                return;
            }
            prev_loss = loss;
        }
        debug!("fit stopped at the epoch limit (loss {:.6})", prev_loss);
    }

    // Raw decision score: bias plus the weighted feature sum. Positive
    // means the fraudulent class.
    pub fn decision(&self, features: &SparseVector) -> f64 {
        let mut z = self.bias;
        for &(idx, value) in features {
            z += self.weights[idx] * value;
        }
        z
    }

    fn loss(
        &self,
        rows: &[SparseVector],
        labels: &[bool],
        sample_weights: &[f64],
        lambda: f64,
    ) -> f64 {
        let total_weight: f64 = sample_weights.iter().sum();
        let mut data_loss = 0.0;
        for ((row, &label), &weight) in rows.iter().zip(labels).zip(sample_weights) {
            let z = self.decision(row);
            let y = if label { 1.0 } else { 0.0 };
            data_loss += weight * (softplus(z) - y * z);
        }

        let penalty = match self.penalty {
            Penalty::L2 => 0.5 * self.weights.iter().map(|w| w * w).sum::<f64>(),
            Penalty::L1 => self.weights.iter().map(|w| w.abs()).sum::<f64>(),
        };

        data_loss / total_weight + lambda * penalty
    }
}

impl Classifier for LogisticRegression {
    fn predict_label(&self, features: &SparseVector) -> bool {
        self.decision(features) > 0.0
    }

    fn predict_confidence(&self, features: &SparseVector) -> Option<f64> {
        let p = sigmoid(self.decision(features));
        Some(p.max(1.0 - p))
    }
}

// Per-sample weights that rebalance an uneven label distribution:
// each class receives total weight n/2.
pub fn balanced_class_weights(labels: &[bool]) -> Vec<f64> {
    let n = labels.len() as f64;
    let n_pos = labels.iter().filter(|&&l| l).count() as f64;
    let n_neg = n - n_pos;

    labels
        .iter()
        .map(|&label| {
            let class_count = if label { n_pos } else { n_neg };
            if class_count > 0.0 {
                n / (2.0 * class_count)
            } else {
                0.0
            }
        })
        .collect()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

// Numerically stable ln(1 + e^z).
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}
