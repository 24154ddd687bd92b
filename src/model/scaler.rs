use ndarray::{Array1, Array2, Axis};

use crate::error::{Error, Result};

/// Per-column z-score standardisation (population std). Constant columns
/// are centred but not scaled.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::InvalidInput("cannot fit scaler on zero rows".to_string()))?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });
        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(self)
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, scale) = self
            .mean
            .as_ref()
            .zip(self.scale.as_ref())
            .ok_or(Error::NotFitted)?;
        if x.ncols() != mean.len() {
            return Err(Error::InvalidInput(format!(
                "scaler fit on {} columns, got {}",
                mean.len(),
                x.ncols()
            )));
        }
        Ok((x - mean) / scale)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}
