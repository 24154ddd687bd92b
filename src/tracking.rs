//! Experiment tracking.
//!
//! The training binary only talks to the [`Tracker`] trait. [`LocalTracker`]
//! keeps everything in a directory tree:
//!
//! ```text
//! {root}/{experiment_id}/meta.json
//! {root}/{experiment_id}/{run_id}/meta.json
//! {root}/{experiment_id}/{run_id}/params/{key}        value
//! {root}/{experiment_id}/{run_id}/metrics/{key}       "<unix_ms> <value> <step>" per line
//! {root}/{experiment_id}/{run_id}/artifacts/{file}
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sink for run parameters, metrics and output files.
pub trait Tracker {
    /// Id of the experiment called `name`, creating it if needed.
    fn create_experiment(&mut self, name: &str) -> Result<String>;

    fn create_run(&mut self, experiment_id: &str, run_name: &str) -> Result<String>;

    fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()>;

    fn log_metric(&mut self, run_id: &str, key: &str, value: f64) -> Result<()>;

    fn log_artifact(&mut self, run_id: &str, path: &Path) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ExperimentMeta {
    experiment_id: String,
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RunMeta {
    run_id: String,
    run_name: String,
    experiment_id: String,
    start_time: u128,
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// File-backed [`Tracker`].
pub struct LocalTracker {
    root: PathBuf,
    // run id -> run directory
    runs: Vec<(String, PathBuf)>,
}

impl LocalTracker {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            runs: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a run created by this tracker.
    pub fn run_dir(&self, run_id: &str) -> Result<&Path> {
        self.runs
            .iter()
            .find(|(id, _)| id == run_id)
            .map(|(_, dir)| dir.as_path())
            .ok_or_else(|| Error::InvalidInput(format!("unknown run id: {run_id}")))
    }

    fn experiments(&self) -> Result<Vec<ExperimentMeta>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let meta = entry?.path().join("meta.json");
            if meta.is_file() {
                found.push(serde_json::from_str(&fs::read_to_string(meta)?)?);
            }
        }
        Ok(found)
    }

    /// One past the largest numeric experiment directory under `root`.
    fn next_experiment_id(&self) -> Result<u64> {
        let mut next = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if let Some(id) = entry.file_name().to_str().and_then(|n| n.parse::<u64>().ok()) {
                next = next.max(id + 1);
            }
        }
        Ok(next)
    }

    /// `{run_dir}/{kind}/{key}`. Keys become file names, so anything that
    /// could leave the directory is rejected.
    fn record_path(&self, run_id: &str, kind: &str, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
            return Err(Error::InvalidInput(format!("invalid {kind} key: {key:?}")));
        }
        Ok(self.run_dir(run_id)?.join(kind).join(key))
    }
}

impl Tracker for LocalTracker {
    fn create_experiment(&mut self, name: &str) -> Result<String> {
        let existing = self.experiments()?;
        if let Some(exp) = existing.iter().find(|e| e.name == name) {
            return Ok(exp.experiment_id.clone());
        }

        let experiment_id = self.next_experiment_id()?.to_string();
        let dir = self.root.join(&experiment_id);
        fs::create_dir_all(&dir)?;
        let meta = ExperimentMeta {
            experiment_id: experiment_id.clone(),
            name: name.to_string(),
        };
        fs::write(dir.join("meta.json"), serde_json::to_string_pretty(&meta)?)?;
        info!("created experiment '{name}' ({experiment_id})");
        Ok(experiment_id)
    }

    fn create_run(&mut self, experiment_id: &str, run_name: &str) -> Result<String> {
        let exp_dir = self.root.join(experiment_id);
        if !exp_dir.join("meta.json").is_file() {
            return Err(Error::InvalidInput(format!(
                "unknown experiment id: {experiment_id}"
            )));
        }

        let run_id = format!("{:016x}", rand::thread_rng().gen::<u64>());
        let dir = exp_dir.join(&run_id);
        for sub in ["params", "metrics", "artifacts"] {
            fs::create_dir_all(dir.join(sub))?;
        }
        let meta = RunMeta {
            run_id: run_id.clone(),
            run_name: run_name.to_string(),
            experiment_id: experiment_id.to_string(),
            start_time: now_ms(),
        };
        fs::write(dir.join("meta.json"), serde_json::to_string_pretty(&meta)?)?;
        self.runs.push((run_id.clone(), dir));
        info!("started run '{run_name}' ({run_id})");
        Ok(run_id)
    }

    fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()> {
        let path = self.record_path(run_id, "params", key)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn log_metric(&mut self, run_id: &str, key: &str, value: f64) -> Result<()> {
        let path = self.record_path(run_id, "metrics", key)?;
        let step = match fs::read_to_string(&path) {
            Ok(existing) => existing.lines().count(),
            Err(_) => 0,
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{} {value} {step}", now_ms())?;
        Ok(())
    }

    fn log_artifact(&mut self, run_id: &str, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("not a file: {}", path.display())))?;
        let target = self.run_dir(run_id)?.join("artifacts").join(file_name);
        fs::copy(path, target)?;
        Ok(())
    }
}
