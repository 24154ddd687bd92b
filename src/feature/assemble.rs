use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::{FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use log::{debug, info, log_enabled, Level};

use super::cache::FeatureCache;
use super::FeaturePair;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Column accumulator for one split
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SplitColumns {
    fields: Vec<FieldRef>,
    columns: Vec<ArrayRef>,
    rows: Option<usize>,
}

impl SplitColumns {
    fn push(&mut self, feature: &str, batch: &RecordBatch) -> Result<()> {
        let rows = batch.num_rows();
        match self.rows {
            Some(expected) if expected != rows => {
                return Err(Error::RowCountMismatch {
                    feature: feature.to_string(),
                    expected,
                    actual: rows,
                })
            }
            _ => self.rows = Some(rows),
        }
        self.fields.extend(batch.schema().fields().iter().cloned());
        self.columns.extend(batch.columns().iter().cloned());
        Ok(())
    }

    fn finish(self) -> Result<RecordBatch> {
        let schema = Arc::new(Schema::new(self.fields));
        Ok(RecordBatch::try_new(schema, self.columns)?)
    }
}

// ---------------------------------------------------------------------------
// DatasetAssembler
// ---------------------------------------------------------------------------

/// Joins cached feature records column-wise into model-ready tables.
///
/// Rows are joined by position. Every record must come from the same raw
/// row ordering; that cannot be checked from the columns alone.
pub struct DatasetAssembler<'a> {
    cache: &'a FeatureCache,
}

impl<'a> DatasetAssembler<'a> {
    pub fn new(cache: &'a FeatureCache) -> Self {
        Self { cache }
    }

    /// Load `names` in order and concatenate their columns.
    ///
    /// Missing records are an error, never recomputed. A column name produced
    /// by two features is a [`Error::SchemaConflict`].
    pub fn assemble<S: AsRef<str>>(&self, names: &[S]) -> Result<FeaturePair> {
        if names.is_empty() {
            return Err(Error::EmptySelection);
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut train = SplitColumns::default();
        let mut test = SplitColumns::default();

        for name in names {
            let name = name.as_ref().to_ascii_lowercase();
            let record = self.cache.load(&name)?;
            record.check_columns(&name)?;

            for column in record.column_names() {
                if !seen.insert(column.clone()) {
                    return Err(Error::SchemaConflict {
                        column,
                        feature: name,
                    });
                }
            }
            train.push(&name, &record.train)?;
            test.push(&name, &record.test)?;
        }

        let pair = FeaturePair::new(train.finish()?, test.finish()?);
        info!(
            "assembled {} columns: train {} rows, test {} rows",
            pair.train.num_columns(),
            pair.train.num_rows(),
            pair.test.num_rows()
        );
        if log_enabled!(Level::Debug) {
            let head = pair.train.slice(0, pair.train.num_rows().min(5));
            debug!("train head:\n{}", pretty_format_batches(&[head])?);
        }
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::cache::CacheFormat;

    fn cache_with(records: &[(&str, &str, Vec<i64>, Vec<i64>)]) -> (tempfile::TempDir, FeatureCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = FeatureCache::new(dir.path(), CacheFormat::Feather);
        for (name, column, train, test) in records {
            let pair = FeaturePair::from_int_columns(column, train.clone(), test.clone()).unwrap();
            cache.save(name, &pair).unwrap();
        }
        (dir, cache)
    }

    #[test]
    fn columns_follow_requested_order() {
        let (_dir, cache) = cache_with(&[
            ("a", "A", vec![1, 2, 3], vec![4]),
            ("b", "B", vec![5, 6, 7], vec![8]),
        ]);
        let assembler = DatasetAssembler::new(&cache);

        let ab = assembler.assemble(&["a", "b"]).unwrap();
        assert_eq!(ab.column_names(), vec!["A", "B"]);
        assert_eq!(ab.train.num_rows(), 3);
        assert_eq!(ab.test.num_rows(), 1);

        let ba = assembler.assemble(&["B", "A"]).unwrap();
        assert_eq!(ba.column_names(), vec!["B", "A"]);
        assert_eq!(ba.train.column(1), ab.train.column(0));
    }

    #[test]
    fn shared_column_is_a_conflict() {
        let (_dir, cache) = cache_with(&[
            ("a", "X", vec![1], vec![1]),
            ("b", "X", vec![2], vec![2]),
        ]);
        let err = DatasetAssembler::new(&cache).assemble(&["a", "b"]).unwrap_err();
        match err {
            Error::SchemaConflict { column, feature } => {
                assert_eq!(column, "X");
                assert_eq!(feature, "b");
            }
            other => panic!("expected SchemaConflict, got {other:?}"),
        }
    }

    #[test]
    fn missing_record_is_not_recomputed() {
        let (_dir, cache) = cache_with(&[("a", "A", vec![1], vec![1])]);
        let err = DatasetAssembler::new(&cache).assemble(&["a", "nope"]).unwrap_err();
        assert!(matches!(err, Error::MissingRecord { ref name, .. } if name == "nope"));
    }

    #[test]
    fn misaligned_records_are_rejected() {
        let (_dir, cache) = cache_with(&[
            ("a", "A", vec![1, 2], vec![1]),
            ("b", "B", vec![1, 2, 3], vec![1]),
        ]);
        let err = DatasetAssembler::new(&cache).assemble(&["a", "b"]).unwrap_err();
        assert!(matches!(err, Error::RowCountMismatch { expected: 2, actual: 3, .. }));
    }

    #[test]
    fn empty_selection_fails() {
        let (_dir, cache) = cache_with(&[]);
        let names: [&str; 0] = [];
        assert!(matches!(
            DatasetAssembler::new(&cache).assemble(&names),
            Err(Error::EmptySelection)
        ));
    }
}
