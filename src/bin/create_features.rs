use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use titanic_pipeline::config::FeatureConfig;
use titanic_pipeline::data::loader;
use titanic_pipeline::feature::{FeatureCache, FeatureGenerator, FeatureRegistry};
use titanic_pipeline::logging;

fn main() -> Result<()> {
    logging::init_console().context("initialising logging")?;

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/feature.yaml"));
    let config = FeatureConfig::from_path(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let raw = loader::load_raw(&config.train_path, &config.test_path)
        .context("reading raw CSVs")?;
    let registry = FeatureRegistry::titanic();
    let cache = FeatureCache::new(&config.save_dir, config.format);
    let mut generator = FeatureGenerator::new(&registry, &cache, &raw, config.random_seed);

    let report = match &config.features {
        Some(names) => generator.generate(names, config.overwrite)?,
        None => generator.generate_all(config.overwrite)?,
    };
    info!(
        "computed {} features, skipped {} (cache: {})",
        report.computed.len(),
        report.skipped.len(),
        cache.save_dir().display()
    );
    Ok(())
}
