//! End-to-end ingest: discover realization files on disk, load them in
//! parallel and build a queryable backing store from the result.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float32Array, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{TimeZone, Utc};
use ensemble_summary_core::discovery::discover_realization_files;
use ensemble_summary_core::ingest::load_per_realization_tables;
use ensemble_summary_core::table::access::real_values;
use ensemble_summary_core::{
    EnsembleSummaryProvider, Frequency, LazyResamplingProvider, ResamplingOptions, StoreLocation,
};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn ms(y: i32, m: u32, d: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .unwrap()
        .timestamp_millis()
}

fn write_realization(path: &Path, dates: &[i64], fopt: &[f32]) -> TestResult {
    fs::create_dir_all(path.parent().unwrap())?;
    let schema = Arc::new(Schema::new(vec![
        Field::new(
            "DATE",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
        Field::new("FOPT", DataType::Float32, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(TimestampMillisecondArray::from(dates.to_vec())),
        Arc::new(Float32Array::from(fopt.to_vec())),
    ];
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns)?;

    let mut writer = ArrowWriter::try_new(File::create(path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

#[test]
fn discovered_files_become_a_monthly_queryable_store() -> TestResult {
    let runs = TempDir::new()?;
    for real in [0_u32, 1, 3] {
        let path = runs
            .path()
            .join(format!("realization-{real}/iter-0/share/results/summary.parquet"));
        let base = real as f32 * 100.0;
        write_realization(
            &path,
            &[ms(2021, 1, 1), ms(2021, 1, 20), ms(2021, 3, 1)],
            &[base, base + 10.0, base + 20.0],
        )?;
    }
    // Another iteration is not part of this ensemble.
    write_realization(
        &runs
            .path()
            .join("realization-0/iter-1/share/results/summary.parquet"),
        &[ms(2021, 1, 1)],
        &[0.0],
    )?;

    let files = discover_realization_files(runs.path(), "realization-*/iter-0/**/*.parquet")?;
    assert_eq!(files.keys().copied().collect::<Vec<_>>(), vec![0, 1, 3]);

    let tables = load_per_realization_tables(&files)?;

    let stores = TempDir::new()?;
    let location = StoreLocation::local(stores.path());
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location, "iter-0", &tables,
    )?;
    let provider = LazyResamplingProvider::from_backing_store(&location, "iter-0")?.unwrap();
    assert_eq!(provider.realizations(), vec![0, 1, 3]);

    let monthly = provider.get_vectors_df(
        &["FOPT"],
        Some(ResamplingOptions::new(Frequency::Monthly)),
        Some(&[3]),
    )?;
    assert_eq!(real_values(&monthly)?, &[3, 3, 3]);
    let fopt = monthly
        .column_by_name("FOPT")
        .unwrap()
        .as_any()
        .downcast_ref::<Float32Array>()
        .unwrap();
    assert_eq!(fopt.value(0), 300.0);
    assert!(fopt.value(1) > 310.0 && fopt.value(1) < 320.0);
    assert_eq!(fopt.value(2), 320.0);
    Ok(())
}
