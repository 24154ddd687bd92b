//! L2-regularised logistic regression fit by batch gradient descent.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::Classifier;
use crate::error::{Error, Result};

/// Hyperparameters, read from the `params` mapping of the model config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticParams {
    /// L2 penalty.
    pub alpha: f64,
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Stop once the gradient norm falls below this.
    pub tol: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            alpha: 0.01,
            max_iter: 1000,
            learning_rate: 0.1,
            tol: 1e-6,
        }
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    weights: Array1<f64>,
    bias: f64,
}

/// Binary logistic regression over labels in {0, 1}.
#[derive(Debug, Clone, Default)]
pub struct LogisticRegression {
    pub params: LogisticParams,
    fitted: Option<Fitted>,
}

impl LogisticRegression {
    pub fn new(params: LogisticParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// P(label = 1) per row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let fitted = self.fitted.as_ref().ok_or(Error::NotFitted)?;
        if x.ncols() != fitted.weights.len() {
            return Err(Error::InvalidInput(format!(
                "model fit on {} features, got {}",
                fitted.weights.len(),
                x.ncols()
            )));
        }
        Ok(Self::sigmoid(&(x.dot(&fitted.weights) + fitted.bias)))
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(Error::InvalidInput(format!(
                "{n_samples} rows but {} labels",
                y.len()
            )));
        }
        if n_samples == 0 {
            return Err(Error::InvalidInput("cannot fit on zero rows".to_string()));
        }

        let LogisticParams {
            alpha,
            max_iter,
            learning_rate: lr,
            tol,
        } = self.params;
        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;

        for _ in 0..max_iter {
            let errors = Self::sigmoid(&(x.dot(&weights) + bias)) - y;
            let dw = x.t().dot(&errors) / n_samples as f64 + alpha * &weights;
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < tol {
                break;
            }
            weights = weights - lr * dw;
            bias -= lr * db;
        }

        self.fitted = Some(Fitted { weights, bias });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }
}
