use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{error, info};

use titanic_pipeline::config::ModelConfig;
use titanic_pipeline::data::loader;
use titanic_pipeline::feature::{DatasetAssembler, FeatureCache};
use titanic_pipeline::logging;
use titanic_pipeline::model::{build_model, to_matrix, Runner};
use titanic_pipeline::tracking::{LocalTracker, Tracker};

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/model.yaml"));
    let config = ModelConfig::from_path(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    logging::init_root_logger(&config.log_dir, &config.log_normal, &config.log_error)
        .context("initialising logging")?;

    if let Err(e) = train(&config) {
        error!("{e:#}");
        return Err(e);
    }
    Ok(())
}

fn train(config: &ModelConfig) -> Result<()> {
    let cache = FeatureCache::new(&config.feature_dir, config.format);
    let features = DatasetAssembler::new(&cache)
        .assemble(&config.feat_list)
        .context("assembling features")?;

    let raw = loader::load_raw(&config.train_path, &config.test_path)
        .context("reading raw CSVs")?;
    let label = raw.labels()?;

    let mut tracker = LocalTracker::new(&config.tracking_dir)?;
    let experiment_id = tracker.create_experiment(&config.experiment_name)?;
    let run_id = tracker.create_run(&experiment_id, &config.run_name)?;
    tracker.log_param(&run_id, "model_name", &config.model_name)?;
    tracker.log_param(&run_id, "feat_list", &config.feat_list.join(","))?;
    tracker.log_param(&run_id, "n_fold", &config.n_fold.to_string())?;
    tracker.log_param(&run_id, "random_seed", &config.random_seed.to_string())?;
    if let Some(params) = config.params.as_mapping() {
        for (key, value) in params {
            let key = serde_yaml::to_string(key)?;
            let value = serde_yaml::to_string(value)?;
            tracker.log_param(&run_id, key.trim(), value.trim())?;
        }
    }

    let model = build_model(&config.model_name, &config.params)?;
    let mut runner = Runner::new(&config.run_name, model, config.n_fold, config.random_seed);
    let report = runner.run_cv(&to_matrix(&features.train)?, &label)?;
    for (fold, score) in report.fold_scores.iter().enumerate() {
        info!("fold {fold}: accuracy {score:.4}");
    }
    tracker.log_metric(&run_id, "cv_score", report.mean)?;

    if let Some(path) = &config.submission_path {
        let pred = runner.predict(&to_matrix(&features.test)?)?;
        loader::write_submission(path, &raw.test, &pred.to_vec())
            .with_context(|| format!("writing {}", path.display()))?;
        tracker.log_artifact(&run_id, path)?;
        info!("wrote submission to {}", path.display());
    }
    Ok(())
}
