use ndarray::Array1;
use serde::Deserialize;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Passenger – one row of train.csv / test.csv
// ---------------------------------------------------------------------------

/// A single passenger record in the Kaggle schema.
///
/// Empty CSV cells deserialize to `None`. `survived` is absent from the
/// test file and defaults to `None` there.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Passenger {
    pub passenger_id: i64,
    #[serde(default)]
    pub survived: Option<u8>,
    pub pclass: i64,
    pub name: String,
    pub sex: String,
    pub age: Option<f64>,
    pub sib_sp: i64,
    pub parch: i64,
    #[serde(default)]
    pub ticket: String,
    pub fare: Option<f64>,
    #[serde(default)]
    pub cabin: Option<String>,
    pub embarked: Option<String>,
}

// ---------------------------------------------------------------------------
// RawDataset – the immutable train/test pair
// ---------------------------------------------------------------------------

/// Raw competition data. Row order is file order and is the only key that
/// ties cached feature columns back to passengers.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub train: Vec<Passenger>,
    pub test: Vec<Passenger>,
}

impl RawDataset {
    pub fn new(train: Vec<Passenger>, test: Vec<Passenger>) -> Self {
        Self { train, test }
    }

    /// Train rows followed by test rows, for statistics over the union.
    pub fn union(&self) -> impl Iterator<Item = &Passenger> {
        self.train.iter().chain(self.test.iter())
    }

    /// The `Survived` column of the train split, aligned by row position.
    pub fn labels(&self) -> Result<Array1<f64>> {
        labels_of(&self.train)
    }
}

/// Extract the label vector from train rows.
pub fn labels_of(rows: &[Passenger]) -> Result<Array1<f64>> {
    rows.iter()
        .enumerate()
        .map(|(row, p)| {
            p.survived
                .map(f64::from)
                .ok_or(Error::MissingLabel { row })
        })
        .collect::<Result<Vec<_>>>()
        .map(Array1::from)
}
