use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn from_counts(tp: usize, fp: usize, fn_: usize) -> Self {
        // Undefined ratios degrade to zero instead of NaN
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            precision,
            recall,
            f1,
            support: tp + fn_,
        }
    }
}

// Held-out metrics for both classes, in the shape of the usual
// per-class precision/recall/f1 report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub legitimate: ClassMetrics,
    pub fraudulent: ClassMetrics,
    pub accuracy: f64,
}

impl ClassificationReport {
    pub fn compute(y_true: &[bool], y_pred: &[bool]) -> Self {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut tn = 0usize;
        for (&truth, &pred) in y_true.iter().zip(y_pred) {
            match (truth, pred) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => tn += 1,
            }
        }

        // For the negative class the roles of the counts swap
        let fraudulent = ClassMetrics::from_counts(tp, fp, fn_);
        let legitimate = ClassMetrics::from_counts(tn, fn_, fp);
        let total = y_true.len();
        let accuracy = if total > 0 {
            (tp + tn) as f64 / total as f64
        } else {
            0.0
        };

        Self {
            legitimate,
            fraudulent,
            accuracy,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.legitimate.support + self.fraudulent.support;
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, m) in [
            ("legitimate", &self.legitimate),
            ("fraudulent", &self.fraudulent),
        ] {
            writeln!(
                f,
                "{:>12} {:>10.3} {:>10.3} {:>10.3} {:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>12} {:>32.3} {:>10}", "accuracy", self.accuracy, total)?;

        let macro_avg = |a: f64, b: f64| (a + b) / 2.0;
        writeln!(
            f,
            "{:>12} {:>10.3} {:>10.3} {:>10.3} {:>10}",
            "macro avg",
            macro_avg(self.legitimate.precision, self.fraudulent.precision),
            macro_avg(self.legitimate.recall, self.fraudulent.recall),
            macro_avg(self.legitimate.f1, self.fraudulent.f1),
            total
        )?;

        let weighted = |a: f64, b: f64| {
            if total > 0 {
                (a * self.legitimate.support as f64 + b * self.fraudulent.support as f64)
                    / total as f64
            } else {
                0.0
            }
        };
        writeln!(
            f,
            "{:>12} {:>10.3} {:>10.3} {:>10.3} {:>10}",
            "weighted avg",
            weighted(self.legitimate.precision, self.fraudulent.precision),
            weighted(self.legitimate.recall, self.fraudulent.recall),
            weighted(self.legitimate.f1, self.fraudulent.f1),
            total
        )
    }
}

// F1 of the positive (fraudulent) class, the model selection score.
pub fn f1_score(y_true: &[bool], y_pred: &[bool]) -> f64 {
    ClassificationReport::compute(y_true, y_pred).fraudulent.f1
}
