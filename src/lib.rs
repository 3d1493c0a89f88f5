//! JobShield fraud detection engine
//!
//! Trains a TF-IDF + logistic regression classifier over job posting
//! descriptions and serves predictions and feature-attribution
//! explanations over HTTP. The text normalization pipeline is shared
//! between training and serving.

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod eval;
pub mod preprocess;
pub mod trainer;
pub mod types;
pub mod vectorizer;

pub use artifact::ModelArtifact;
pub use config::Config;
pub use engine::FraudEngine;
pub use error::AppError;
