use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub model_path: String,
    pub max_input_chars: usize,
    pub min_cleaned_chars: usize,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .unwrap_or(8000);

        let model_path =
            env::var("MODEL_PATH").unwrap_or_else(|_| "models/job_fraud_model.json".to_string());

        let max_input_chars = env::var("MAX_INPUT_CHARS")
            .unwrap_or_else(|_| "50000".to_string())
            .parse()
            .unwrap_or(50_000);

        let min_cleaned_chars = env::var("MIN_CLEANED_CHARS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        Ok(Config {
            port,
            model_path,
            max_input_chars,
            min_cleaned_chars,
        })
    }
}
