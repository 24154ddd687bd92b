use log::info;
use ndarray::{Array1, Array2, Axis};

use super::cv::StratifiedKFold;
use super::scaler::StandardScaler;
use super::{accuracy, Classifier};
use crate::error::{Error, Result};
use crate::logging::time_block;

/// Per-fold accuracies and their mean.
#[derive(Debug, Clone, PartialEq)]
pub struct CvReport {
    pub fold_scores: Vec<f64>,
    pub mean: f64,
}

/// Standardise, cross-validate, refit, predict.
///
/// The scaler is fit on the full training matrix once and reused for every
/// fold and for prediction.
pub struct Runner<M> {
    pub run_name: String,
    model: M,
    n_fold: usize,
    random_seed: u64,
    scaler: Option<StandardScaler>,
}

impl<M: Classifier + Clone> Runner<M> {
    pub fn new(run_name: impl Into<String>, model: M, n_fold: usize, random_seed: u64) -> Self {
        Self {
            run_name: run_name.into(),
            model,
            n_fold,
            random_seed,
            scaler: None,
        }
    }

    /// Mean stratified k-fold accuracy, then refit on all of `ftrain`.
    pub fn run_cv(&mut self, ftrain: &Array2<f64>, label: &Array1<f64>) -> Result<CvReport> {
        if ftrain.nrows() != label.len() {
            return Err(Error::InvalidInput(format!(
                "{} feature rows but {} labels",
                ftrain.nrows(),
                label.len()
            )));
        }

        let mut scaler = StandardScaler::new();
        let x = scaler.fit_transform(ftrain)?;

        let folds = StratifiedKFold::new(self.n_fold, true, self.random_seed).split(label)?;
        let fold_scores = time_block(&self.run_name, || {
            folds
                .iter()
                .map(|fold| {
                    let mut model = self.model.clone();
                    model.fit(
                        &x.select(Axis(0), &fold.train_indices),
                        &label.select(Axis(0), &fold.train_indices),
                    )?;
                    let pred = model.predict(&x.select(Axis(0), &fold.test_indices))?;
                    Ok(accuracy(&pred, &label.select(Axis(0), &fold.test_indices)))
                })
                .collect::<Result<Vec<_>>>()
        })?;
        let mean = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
        info!("cv_score:{mean}");

        self.model.fit(&x, label)?;
        self.scaler = Some(scaler);
        Ok(CvReport { fold_scores, mean })
    }

    /// Predict labels for `ftest` with the scaler and model fit by `run_cv`.
    pub fn predict(&self, ftest: &Array2<f64>) -> Result<Array1<f64>> {
        let scaler = self.scaler.as_ref().ok_or(Error::NotFitted)?;
        self.model.predict(&scaler.transform(ftest)?)
    }
}
