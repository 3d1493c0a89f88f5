use crate::error::AppError;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct TrainingRecord {
    pub text: String,
    pub label: bool,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    description: Option<String>,
    fraudulent: Option<String>,
}

// Reads a labeled corpus from a CSV file with `description` and
// `fraudulent` columns; extra columns are ignored. Rows with a missing
// field or a label that is not a finite number are dropped, matching
// the usual drop-incomplete-rows step.
pub fn load_corpus(path: &str) -> Result<Vec<TrainingRecord>, AppError> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.deserialize::<RawRecord>() {
        let row = row?;
        match (row.description, parse_label(row.fraudulent.as_deref())) {
            (Some(text), Some(label)) if !text.trim().is_empty() => {
                records.push(TrainingRecord { text, label });
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!("Dropped {} incomplete records from {}", dropped, path);
    }
    info!("Loaded {} labeled records from {}", records.len(), path);

    Ok(records)
}

// Labels must parse to a finite number; blanks, stray text, and literal
// NaN drop the row like any other incomplete field.
fn parse_label(field: Option<&str>) -> Option<bool> {
    let value: f64 = field?.trim().parse().ok()?;
    if value.is_finite() {
        Some(value != 0.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_corpus_keeps_complete_rows() {
        let file = write_csv(
            "title,description,fraudulent\n\
             a,Legit engineering role,0\n\
             b,Send a fee to start earning,1\n",
        );
        let records = load_corpus(file.path().to_str().unwrap()).unwrap();

        assert_eq!(records.len(), 2);
        assert!(!records[0].label);
        assert!(records[1].label);
        assert_eq!(records[1].text, "Send a fee to start earning");
    }

    #[test]
    fn test_load_corpus_drops_incomplete_rows() {
        let file = write_csv(
            "description,fraudulent\n\
             Valid posting text,0\n\
             ,1\n\
             Missing label,\n",
        );
        let records = load_corpus(file.path().to_str().unwrap()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Valid posting text");
    }

    #[test]
    fn test_load_corpus_drops_unparseable_labels() {
        let file = write_csv(
            "description,fraudulent\n\
             Valid posting text,0\n\
             Label is not a number,maybe\n\
             Another valid posting,1\n",
        );
        let records = load_corpus(file.path().to_str().unwrap()).unwrap();

        assert_eq!(records.len(), 2);
        assert!(!records[0].label);
        assert!(records[1].label);
    }

    #[test]
    fn test_load_corpus_drops_nan_labels() {
        let file = write_csv(
            "description,fraudulent\n\
             Ambiguous posting,NaN\n\
             Clearly fraudulent posting,1\n",
        );
        let records = load_corpus(file.path().to_str().unwrap()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Clearly fraudulent posting");
        assert!(records[0].label);
    }

    #[test]
    fn test_load_corpus_nonzero_label_is_fraudulent() {
        let file = write_csv("description,fraudulent\nSuspicious offer,2\n");
        let records = load_corpus(file.path().to_str().unwrap()).unwrap();
        assert!(records[0].label);
    }

    #[test]
    fn test_load_corpus_missing_file_fails() {
        assert!(load_corpus("does/not/exist.csv").is_err());
    }
}
