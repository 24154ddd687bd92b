use std::path::Path;

use log::info;

use super::model::{Passenger, RawDataset};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the train/test CSV pair.
pub fn load_raw(train_path: &Path, test_path: &Path) -> Result<RawDataset> {
    let train = load_csv(train_path)?;
    let test = load_csv(test_path)?;
    info!(
        "loaded {} train rows from {} and {} test rows from {}",
        train.len(),
        train_path.display(),
        test.len(),
        test_path.display()
    );
    Ok(RawDataset::new(train, test))
}

/// Read one passenger CSV. Columns are matched by header name, so extra
/// columns are ignored and column order does not matter.
pub fn load_csv(path: &Path) -> Result<Vec<Passenger>> {
    let reader = csv::Reader::from_path(path)?;
    read_passengers(reader)
}

/// Deserialize passengers from any CSV reader.
pub fn read_passengers<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Passenger>> {
    reader
        .deserialize::<Passenger>()
        .map(|row| row.map_err(Into::into))
        .collect()
}

// ---------------------------------------------------------------------------
// Submission writer
// ---------------------------------------------------------------------------

/// Write a Kaggle submission: `PassengerId,Survived` per test row.
pub fn write_submission(path: &Path, test: &[Passenger], predictions: &[f64]) -> Result<()> {
    if test.len() != predictions.len() {
        return Err(crate::error::Error::InvalidInput(format!(
            "{} test rows but {} predictions",
            test.len(),
            predictions.len()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["PassengerId", "Survived"])?;
    for (passenger, &pred) in test.iter().zip(predictions) {
        writer.write_record([
            passenger.passenger_id.to_string(),
            (pred.round() as i64).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
