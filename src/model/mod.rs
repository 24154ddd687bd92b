//! Training layer: standardisation, stratified CV and the classifier.

pub mod cv;
pub mod logistic;
pub mod runner;
pub mod scaler;

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use ndarray::{Array1, Array2};

use crate::error::{Error, Result};

pub use logistic::{LogisticParams, LogisticRegression};
pub use runner::{CvReport, Runner};

/// A binary classifier over dense `f64` features.
pub trait Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// Build the classifier named by `model_name` from its YAML `params`.
pub fn build_model(model_name: &str, params: &serde_yaml::Value) -> Result<LogisticRegression> {
    match model_name {
        "logistic_regression" | "LogisticRegression" => {
            let params: LogisticParams = if params.is_null() {
                LogisticParams::default()
            } else {
                serde_yaml::from_value(params.clone())?
            };
            Ok(LogisticRegression::new(params))
        }
        other => Err(Error::UnknownModel(other.to_string())),
    }
}

/// Fraction of predictions equal to the labels.
pub fn accuracy(pred: &Array1<f64>, y: &Array1<f64>) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let correct = pred
        .iter()
        .zip(y.iter())
        .filter(|(p, t)| (*p - *t).abs() < 0.5)
        .count();
    correct as f64 / y.len() as f64
}

/// Dense row-major matrix of every column of `batch`, cast to `f64`.
pub fn to_matrix(batch: &RecordBatch) -> Result<Array2<f64>> {
    let (rows, cols) = (batch.num_rows(), batch.num_columns());
    let mut matrix = Array2::<f64>::zeros((rows, cols));

    for (j, column) in batch.columns().iter().enumerate() {
        let name = batch.schema().field(j).name().clone();
        if column.null_count() > 0 {
            return Err(Error::InvalidInput(format!("column '{name}' contains nulls")));
        }
        let values = cast(column, &DataType::Float64)?;
        for (i, v) in values.as_primitive::<Float64Type>().values().iter().enumerate() {
            matrix[[i, j]] = *v;
        }
    }
    Ok(matrix)
}
