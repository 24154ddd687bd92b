use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::compute::concat_batches;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};

use super::FeaturePair;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// On-disk format
// ---------------------------------------------------------------------------

/// Columnar file format of cache records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheFormat {
    /// Arrow IPC file.
    #[default]
    Feather,
    Parquet,
}

impl CacheFormat {
    pub fn extension(self) -> &'static str {
        match self {
            CacheFormat::Feather => "feather",
            CacheFormat::Parquet => "parquet",
        }
    }

    fn write(self, path: &Path, batch: &RecordBatch) -> Result<()> {
        let file = File::create(path)?;
        match self {
            CacheFormat::Feather => {
                let mut writer = FileWriter::try_new(file, &batch.schema())?;
                writer.write(batch)?;
                writer.finish()?;
            }
            CacheFormat::Parquet => {
                let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
                writer.write(batch)?;
                writer.close()?;
            }
        }
        Ok(())
    }

    fn read(self, path: &Path) -> Result<RecordBatch> {
        let file = File::open(path)?;
        let (schema, batches) = match self {
            CacheFormat::Feather => {
                let reader = FileReader::try_new(file, None)?;
                let schema = reader.schema();
                let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
                (schema, batches)
            }
            CacheFormat::Parquet => {
                let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
                let schema = builder.schema().clone();
                let batches = builder.build()?.collect::<std::result::Result<Vec<_>, _>>()?;
                (schema, batches)
            }
        };
        Ok(concat_batches(&schema, &batches)?)
    }
}

// ---------------------------------------------------------------------------
// FeatureCache
// ---------------------------------------------------------------------------

/// Locations of one cache record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPaths {
    pub train: PathBuf,
    pub test: PathBuf,
}

/// Maps a feature name to its pair of files under `save_dir`.
///
/// Validity is keyed purely on file existence: a record written from an
/// older raw dataset is still a hit. Entries live until deleted by hand or
/// overwritten by a forced regeneration.
#[derive(Debug, Clone)]
pub struct FeatureCache {
    save_dir: PathBuf,
    format: CacheFormat,
}

impl FeatureCache {
    pub fn new(save_dir: impl Into<PathBuf>, format: CacheFormat) -> Self {
        Self {
            save_dir: save_dir.into(),
            format,
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn format(&self) -> CacheFormat {
        self.format
    }

    /// `{save_dir}/{name}_ftrain.<ext>` and `{save_dir}/{name}_ftest.<ext>`.
    pub fn paths(&self, name: &str) -> RecordPaths {
        let ext = self.format.extension();
        RecordPaths {
            train: self.save_dir.join(format!("{name}_ftrain.{ext}")),
            test: self.save_dir.join(format!("{name}_ftest.{ext}")),
        }
    }

    /// True only when both parts are on disk.
    pub fn exists(&self, name: &str) -> bool {
        let paths = self.paths(name);
        paths.train.is_file() && paths.test.is_file()
    }

    /// Persist both parts. Each part is written beside its target and renamed
    /// into place, so a crash never leaves a truncated record under the final
    /// name.
    pub fn save(&self, name: &str, pair: &FeaturePair) -> Result<()> {
        pair.check_columns(name)?;
        std::fs::create_dir_all(&self.save_dir)?;

        let paths = self.paths(name);
        for (path, batch) in [(&paths.train, &pair.train), (&paths.test, &pair.test)] {
            let tmp = path.with_extension(format!("{}.tmp", self.format.extension()));
            self.format.write(&tmp, batch)?;
            std::fs::rename(&tmp, path)?;
            debug!("wrote {} rows to {}", batch.num_rows(), path.display());
        }
        Ok(())
    }

    /// Read both parts back.
    pub fn load(&self, name: &str) -> Result<FeaturePair> {
        let paths = self.paths(name);
        for path in [&paths.train, &paths.test] {
            if !path.is_file() {
                return Err(Error::MissingRecord {
                    name: name.to_string(),
                    path: path.clone(),
                });
            }
        }
        Ok(FeaturePair {
            train: self.format.read(&paths.train)?,
            test: self.format.read(&paths.test)?,
        })
    }
}
