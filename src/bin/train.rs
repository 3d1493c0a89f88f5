use jobshield_engine::dataset::load_corpus;
use jobshield_engine::trainer;
use std::env;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let data_path =
        env::var("TRAIN_DATA").unwrap_or_else(|_| "data/fake_job_postings.csv".to_string());
    let model_path =
        env::var("MODEL_OUT").unwrap_or_else(|_| "models/job_fraud_model.json".to_string());

    let records = load_corpus(&data_path)?;
    let outcome = trainer::train(&records)?;

    println!("Best parameters: {}", outcome.artifact.metadata.params);
    println!();
    println!("{}", outcome.report);

    outcome.artifact.save(&model_path)?;
    println!("Model saved to {}", model_path);

    Ok(())
}
