use anyhow::bail;
use jobshield_engine::classifier::Classifier;
use jobshield_engine::dataset::load_corpus;
use jobshield_engine::eval::ClassificationReport;
use jobshield_engine::preprocess::clean_text;
use jobshield_engine::ModelArtifact;
use std::env;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let model_path =
        env::var("MODEL_PATH").unwrap_or_else(|_| "models/job_fraud_model.json".to_string());
    let data_path =
        env::var("EVAL_DATA").unwrap_or_else(|_| "data/fake_job_postings.csv".to_string());

    let artifact = ModelArtifact::load(&model_path)?;
    let records = load_corpus(&data_path)?;
    if records.is_empty() {
        bail!("evaluation corpus {} has no usable records", data_path);
    }

    let y_true: Vec<bool> = records.iter().map(|r| r.label).collect();
    let y_pred: Vec<bool> = records
        .iter()
        .map(|r| {
            let cleaned = clean_text(&r.text);
            artifact.classifier.predict_label(&artifact.vectorizer.transform(&cleaned))
        })
        .collect();

    let report = ClassificationReport::compute(&y_true, &y_pred);
    println!("Evaluated {} records from {}", records.len(), data_path);
    println!();
    println!("{}", report);

    Ok(())
}
