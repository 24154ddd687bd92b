//! YAML configuration for the two binaries. Relative paths are resolved
//! against the working directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::feature::CacheFormat;

/// Settings for feature generation.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureConfig {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub save_dir: PathBuf,
    #[serde(default)]
    pub format: CacheFormat,
    #[serde(default)]
    pub overwrite: bool,
    /// Seed for randomly imputed features; `None` draws from OS entropy.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Subset of feature names to generate; all registered when absent.
    #[serde(default)]
    pub features: Option<Vec<String>>,
}

/// Settings for assembly, training and tracking.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub feature_dir: PathBuf,
    #[serde(default)]
    pub format: CacheFormat,
    pub feat_list: Vec<String>,
    pub model_name: String,
    #[serde(default)]
    pub params: serde_yaml::Value,
    #[serde(default = "default_n_fold")]
    pub n_fold: usize,
    #[serde(default)]
    pub random_seed: u64,
    pub run_name: String,
    #[serde(default = "default_experiment")]
    pub experiment_name: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_normal")]
    pub log_normal: String,
    #[serde(default = "default_log_error")]
    pub log_error: String,
    #[serde(default = "default_tracking_dir")]
    pub tracking_dir: PathBuf,
    pub submission_path: Option<PathBuf>,
}

fn default_n_fold() -> usize {
    5
}

fn default_experiment() -> String {
    "titanic".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_normal() -> String {
    "log.log".to_string()
}

fn default_log_error() -> String {
    "error.log".to_string()
}

fn default_tracking_dir() -> PathBuf {
    PathBuf::from("mlruns")
}

impl FeatureConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(serde_yaml::from_str(&std::fs::read_to_string(path)?)?)
    }
}

impl ModelConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(serde_yaml::from_str(&std::fs::read_to_string(path)?)?)
    }
}
