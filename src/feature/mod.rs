//! Feature layer: derived columns, their on-disk cache and assembly.
//!
//! ```text
//!   RawDataset ──► Feature::create_features ──► FeaturePair
//!                                                   │
//!                  FeatureGenerator (skip if cached) │ save
//!                                                   ▼
//!                                   {save_dir}/{name}_ftrain.feather
//!                                   {save_dir}/{name}_ftest.feather
//!                                                   │ load
//!                                                   ▼
//!                  DatasetAssembler ──► one train table, one test table
//! ```

pub mod assemble;
pub mod binning;
pub mod cache;
pub mod registry;
pub mod titanic;

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rand::RngCore;

use crate::data::model::RawDataset;
use crate::error::{Error, Result};

pub use assemble::DatasetAssembler;
pub use cache::{CacheFormat, FeatureCache};
pub use registry::{FeatureGenerator, FeatureRegistry, GenerateReport};

// ---------------------------------------------------------------------------
// FeaturePair – train/test columns of one or more features
// ---------------------------------------------------------------------------

/// Train-derived and test-derived columns, each row-aligned with its raw split.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePair {
    pub train: RecordBatch,
    pub test: RecordBatch,
}

impl FeaturePair {
    pub fn new(train: RecordBatch, test: RecordBatch) -> Self {
        Self { train, test }
    }

    /// Column names of the train part, in order.
    pub fn column_names(&self) -> Vec<String> {
        column_names(&self.train)
    }

    /// Fail unless train and test carry the same columns in the same order.
    pub fn check_columns(&self, name: &str) -> Result<()> {
        let train = column_names(&self.train);
        let test = column_names(&self.test);
        if train != test {
            return Err(Error::ColumnMismatch {
                name: name.to_string(),
                train,
                test,
            });
        }
        Ok(())
    }

    /// A pair holding one `Int64` column named `column` on each side.
    pub fn from_int_columns(column: &str, train: Vec<i64>, test: Vec<i64>) -> Result<Self> {
        Ok(Self {
            train: int_batch(column, train)?,
            test: int_batch(column, test)?,
        })
    }
}

pub(crate) fn column_names(batch: &RecordBatch) -> Vec<String> {
    batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect()
}

fn int_batch(column: &str, values: Vec<i64>) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![Field::new(column, DataType::Int64, false)]));
    let array: ArrayRef = Arc::new(Int64Array::from(values));
    Ok(RecordBatch::try_new(schema, vec![array])?)
}

// ---------------------------------------------------------------------------
// Feature – one polymorphic unit of work
// ---------------------------------------------------------------------------

/// A derived feature computed from the raw train/test tables.
///
/// `name` is the cache key: the lower-cased variant tag. Implementations are
/// pure over `raw` unless they draw from `rng`.
pub trait Feature {
    fn name(&self) -> &'static str;

    fn create_features(&self, raw: &RawDataset, rng: &mut dyn RngCore) -> Result<FeaturePair>;
}
