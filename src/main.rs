use std::error::Error;

use env_logger::Env;
use sii_classifier::{run, PipelineConfig};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::default();
    let report = run(&config).map_err(|e| {
        log::error!("Run failed: {}", e);
        e
    })?;

    println!("Validation Accuracy: {:.4}", report.validation_accuracy);
    println!("Number of features used in training: {}", report.features.len());
    println!("Features used: {:?}", report.features);

    Ok(())
}
