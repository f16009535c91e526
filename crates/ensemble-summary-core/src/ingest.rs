//! Loading per-realization Parquet files into memory.
//!
//! Output feeds straight into the providers' `write_backing_store_*`
//! functions. Files are read in parallel on the global `rayon` pool; the
//! first failure aborts the whole load.
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::compute::concat_batches;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use rayon::prelude::*;
use snafu::{Backtrace, prelude::*};

/// Errors from loading realization files.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum IngestError {
    /// The file could not be opened.
    #[snafu(display("Failed to open {}: {source}", path.display()))]
    Open {
        /// File being opened.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not readable Parquet.
    #[snafu(display("Failed to read Parquet file {}: {source}", path.display()))]
    Parquet {
        /// File being read.
        path: PathBuf,
        /// Underlying Parquet error.
        source: ParquetError,
        /// Where the failure was captured.
        backtrace: Backtrace,
    },

    /// Decoding or concatenating record batches failed.
    #[snafu(display("Failed to decode {}: {source}", path.display()))]
    Decode {
        /// File being decoded.
        path: PathBuf,
        /// Underlying Arrow error.
        source: ArrowError,
        /// Where the failure was captured.
        backtrace: Backtrace,
    },
}

/// Read every file of `files` into one table per realization.
pub fn load_per_realization_tables(
    files: &BTreeMap<i64, PathBuf>,
) -> Result<BTreeMap<i64, RecordBatch>, IngestError> {
    let tables = files
        .par_iter()
        .map(|(&realization, path)| -> Result<_, IngestError> {
            Ok((realization, read_parquet_table(path)?))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    info!(
        "loaded {} realization table(s), {} row(s) in total",
        tables.len(),
        tables.values().map(RecordBatch::num_rows).sum::<usize>()
    );
    Ok(tables)
}

/// Read a whole Parquet file as a single record batch.
pub fn read_parquet_table(path: &Path) -> Result<RecordBatch, IngestError> {
    let file = File::open(path).context(OpenSnafu { path })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).context(ParquetSnafu { path })?;
    let schema = builder.schema().clone();
    let reader = builder.build().context(ParquetSnafu { path })?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .context(DecodeSnafu { path })?;
    concat_batches(&schema, &batches).context(DecodeSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{make_table, ms};
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn write_parquet(path: &Path, table: &RecordBatch) -> TestResult {
        let mut writer = ArrowWriter::try_new(File::create(path)?, table.schema(), None)?;
        writer.write(table)?;
        writer.close()?;
        Ok(())
    }

    #[test]
    fn loads_each_realization() -> TestResult {
        let tmp = TempDir::new()?;
        let mut files = BTreeMap::new();
        for real in [0_i64, 1, 2] {
            let n = real as usize + 1;
            let dates: Vec<i64> = (1..=n as u32).map(|d| ms(2020, 1, d)).collect();
            let table = make_table(&dates, None, vec![("FOPT", vec![real as f64; n], None)]);
            let path = tmp.path().join(format!("real-{real}.parquet"));
            write_parquet(&path, &table)?;
            files.insert(real, path);
        }

        let tables = load_per_realization_tables(&files)?;
        assert_eq!(tables.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(tables[&0].num_rows(), 1);
        assert_eq!(tables[&2].num_rows(), 3);
        assert_eq!(tables[&1].schema().field(1).name(), "FOPT");
        Ok(())
    }

    #[test]
    fn missing_file_fails_the_whole_load() -> TestResult {
        let tmp = TempDir::new()?;
        let good = tmp.path().join("good.parquet");
        write_parquet(
            &good,
            &make_table(&[ms(2020, 1, 1)], None, vec![("FOPT", vec![1.0], None)]),
        )?;

        let mut files = BTreeMap::new();
        files.insert(0, good);
        files.insert(1, tmp.path().join("missing.parquet"));

        let err = load_per_realization_tables(&files).unwrap_err();
        assert!(matches!(err, IngestError::Open { .. }));
        assert!(err.to_string().contains("missing.parquet"));
        Ok(())
    }

    #[test]
    fn non_parquet_file_is_reported() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("bogus.parquet");
        std::fs::write(&path, b"not parquet at all")?;

        let err = read_parquet_table(&path).unwrap_err();
        assert!(matches!(err, IngestError::Parquet { .. }));
        Ok(())
    }
}
