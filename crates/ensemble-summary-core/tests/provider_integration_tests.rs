//! Integration tests for the backing store lifecycle and provider queries.
//!
//! These tests write stores to a temporary directory, reopen them through
//! both provider variants and check:
//! - Row layout, column order and vector metadata after a round trip,
//! - Resampled, raw and point-in-time queries,
//! - Error reporting for bad input and bad queries,
//! - Provider sets over several stored ensembles.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float64Array, Int64Array, StringArray, TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, TimeZone, Utc};
use ensemble_summary_core::common::columns::{DATE_COLUMN, ENSEMBLE_COLUMN, REAL_COLUMN};
use ensemble_summary_core::metadata::VectorMetadata;
use ensemble_summary_core::store::BackingStoreError;
use ensemble_summary_core::table::access::{date_values, real_values};
use ensemble_summary_core::{
    DateSpan, EnsembleSummaryProvider, EnsembleSummaryProviderSet, Frequency,
    LazyResamplingProvider, PresampledProvider, ProviderError, ResamplingOptions, StoreLocation,
};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

// =============================================================================
// Test Helpers
// =============================================================================

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn ms(y: i32, m: u32, d: u32) -> i64 {
    day(y, m, d).timestamp_millis()
}

fn rate_md(keyword: &str) -> VectorMetadata {
    VectorMetadata {
        unit: "SM3/DAY".to_string(),
        is_rate: true,
        keyword: keyword.to_string(),
        ..VectorMetadata::default()
    }
}

fn total_md(keyword: &str) -> VectorMetadata {
    VectorMetadata {
        unit: "SM3".to_string(),
        is_total: true,
        keyword: keyword.to_string(),
        ..VectorMetadata::default()
    }
}

fn vector_field(name: &str, md: Option<&VectorMetadata>) -> Field {
    let field = Field::new(name, DataType::Float64, true);
    match md {
        Some(md) => field.with_metadata(md.to_field_metadata()),
        None => field,
    }
}

/// Per-realization input: `DATE` plus Float64 vectors.
fn realization_table(dates: &[i64], vectors: &[(&str, Vec<f64>)]) -> RecordBatch {
    let mut fields = vec![Field::new(
        DATE_COLUMN,
        DataType::Timestamp(TimeUnit::Millisecond, None),
        false,
    )];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(TimestampMillisecondArray::from(dates.to_vec()))];
    for (name, values) in vectors {
        let md = match *name {
            "TOT" => Some(total_md("FOPT")),
            "RATE" => Some(rate_md("FOPR")),
            _ => None,
        };
        fields.push(vector_field(name, md.as_ref()));
        columns.push(Arc::new(Float64Array::from(values.clone())));
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap()
}

fn f64_column(table: &RecordBatch, name: &str) -> Vec<f64> {
    table
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap()
        .values()
        .to_vec()
}

fn column_names(table: &RecordBatch) -> Vec<String> {
    table
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect()
}

/// Two realizations with different, irregular dates, inserted out of order.
fn two_realizations() -> BTreeMap<i64, RecordBatch> {
    let mut tables = BTreeMap::new();
    tables.insert(
        2,
        realization_table(
            &[ms(2020, 1, 2), ms(2020, 1, 3)],
            &[("TOT", vec![5.0, 15.0]), ("RATE", vec![2.0, 3.0])],
        ),
    );
    tables.insert(
        0,
        realization_table(
            &[ms(2020, 1, 1), ms(2020, 1, 3)],
            &[("TOT", vec![0.0, 20.0]), ("RATE", vec![1.0, 3.0])],
        ),
    );
    tables
}

fn open_lazy(location: &StoreLocation, key: &str) -> LazyResamplingProvider {
    LazyResamplingProvider::from_backing_store(location, key)
        .unwrap()
        .expect("store exists")
}

fn open_presampled(location: &StoreLocation, key: &str) -> PresampledProvider {
    PresampledProvider::from_backing_store(location, key)
        .unwrap()
        .expect("store exists")
}

// =============================================================================
// Lazy resampling provider
// =============================================================================

#[test]
fn missing_store_opens_as_none() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    assert!(LazyResamplingProvider::from_backing_store(&location, "iter-0")?.is_none());
    assert!(PresampledProvider::from_backing_store(&location, "iter-0")?.is_none());
    Ok(())
}

#[test]
fn lazy_round_trip_keeps_layout_and_metadata() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    let path = LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location,
        "iter-0",
        &two_realizations(),
    )?;
    assert!(path.starts_with(tmp.path()));
    assert!(path.exists());

    let provider = open_lazy(&location, "iter-0");
    assert!(provider.supports_resampling());
    assert_eq!(provider.vector_names(), vec!["TOT", "RATE"]);
    assert_eq!(provider.realizations(), vec![0, 2]);
    assert_eq!(provider.vector_metadata("RATE"), Some(rate_md("FOPR")));
    assert_eq!(provider.vector_metadata("TOT"), Some(total_md("FOPT")));
    assert_eq!(provider.vector_metadata("NOPE"), None);

    let raw = provider.get_vectors_df(&["RATE", "TOT"], None, None)?;
    assert_eq!(column_names(&raw), vec![DATE_COLUMN, REAL_COLUMN, "RATE", "TOT"]);
    assert_eq!(real_values(&raw)?, &[0, 0, 2, 2]);
    assert_eq!(
        date_values(&raw)?,
        &[ms(2020, 1, 1), ms(2020, 1, 3), ms(2020, 1, 2), ms(2020, 1, 3)]
    );
    assert_eq!(f64_column(&raw, "TOT"), vec![0.0, 20.0, 5.0, 15.0]);
    Ok(())
}

#[test]
fn lazy_daily_resampling_mixes_linear_and_backfill() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    let mut tables = BTreeMap::new();
    tables.insert(
        1,
        realization_table(
            &[ms(2020, 1, 1), ms(2020, 1, 4), ms(2020, 1, 6)],
            &[("TOT", vec![10.0, 40.0, 60.0]), ("RATE", vec![1.0, 4.0, 6.0])],
        ),
    );
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location, "daily", &tables,
    )?;
    let provider = open_lazy(&location, "daily");

    let out = provider.get_vectors_df(
        &["TOT", "RATE"],
        Some(ResamplingOptions::new(Frequency::Daily)),
        None,
    )?;
    let expected_dates: Vec<i64> = (1..=6).map(|d| ms(2020, 1, d)).collect();
    assert_eq!(date_values(&out)?, expected_dates.as_slice());
    assert_eq!(real_values(&out)?, &[1; 6]);
    assert_eq!(
        f64_column(&out, "TOT"),
        vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]
    );
    assert_eq!(f64_column(&out, "RATE"), vec![1.0, 4.0, 4.0, 4.0, 6.0, 6.0]);
    Ok(())
}

#[test]
fn lazy_resampling_onto_shared_grid() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location,
        "iter-0",
        &two_realizations(),
    )?;
    let provider = open_lazy(&location, "iter-0");

    let own_grids = provider.get_vectors_df(
        &["TOT"],
        Some(ResamplingOptions::new(Frequency::Daily)),
        None,
    )?;
    assert_eq!(real_values(&own_grids)?, &[0, 0, 0, 2, 2]);

    let intersection = provider.get_vectors_df(
        &["TOT"],
        Some(ResamplingOptions::new(Frequency::Daily).with_common_date_span(DateSpan::Intersection)),
        None,
    )?;
    assert_eq!(real_values(&intersection)?, &[0, 0, 2, 2]);
    assert_eq!(f64_column(&intersection, "TOT"), vec![10.0, 20.0, 5.0, 15.0]);

    let union = provider.get_vectors_df(
        &["TOT"],
        Some(ResamplingOptions::new(Frequency::Daily).with_common_date_span(DateSpan::Union)),
        None,
    )?;
    assert_eq!(real_values(&union)?, &[0, 0, 0, 2, 2, 2]);
    Ok(())
}

#[test]
fn lazy_dates_by_span_and_frequency() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location,
        "iter-0",
        &two_realizations(),
    )?;
    let provider = open_lazy(&location, "iter-0");

    assert_eq!(
        provider.dates(None, None, DateSpan::Intersection)?,
        vec![day(2020, 1, 3)]
    );
    assert_eq!(
        provider.dates(None, None, DateSpan::Union)?,
        vec![day(2020, 1, 1), day(2020, 1, 2), day(2020, 1, 3)]
    );
    assert_eq!(
        provider.dates(Some(Frequency::Daily), None, DateSpan::Intersection)?,
        vec![day(2020, 1, 2), day(2020, 1, 3)]
    );
    assert_eq!(
        provider.dates(Some(Frequency::Monthly), None, DateSpan::Union)?,
        vec![day(2020, 1, 1), day(2020, 2, 1)]
    );
    assert_eq!(
        provider.dates(None, Some(&[0]), DateSpan::Intersection)?,
        vec![day(2020, 1, 1), day(2020, 1, 3)]
    );
    Ok(())
}

#[test]
fn lazy_point_sample_between_knots() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location,
        "iter-0",
        &two_realizations(),
    )?;
    let provider = open_lazy(&location, "iter-0");

    let noon = Utc.with_ymd_and_hms(2020, 1, 2, 12, 0, 0).unwrap();
    let out = provider.get_vectors_for_date_df(noon, &["TOT", "RATE"], None)?;
    assert_eq!(column_names(&out), vec![REAL_COLUMN, "TOT", "RATE"]);
    assert_eq!(real_values(&out)?, &[0, 2]);
    assert_eq!(f64_column(&out, "TOT"), vec![15.0, 10.0]);
    assert_eq!(f64_column(&out, "RATE"), vec![3.0, 3.0]);

    let only_two = provider.get_vectors_for_date_df(day(2020, 1, 3), &["TOT"], Some(&[2, 7]))?;
    assert_eq!(real_values(&only_two)?, &[2]);
    assert_eq!(f64_column(&only_two, "TOT"), vec![15.0]);
    Ok(())
}

#[test]
fn query_errors_are_reported() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location,
        "iter-0",
        &two_realizations(),
    )?;
    let provider = open_lazy(&location, "iter-0");

    assert!(matches!(
        provider.get_vectors_df(&[], None, None),
        Err(ProviderError::EmptyVectorNames)
    ));
    match provider.get_vectors_df(&["TOT", "FWPT"], None, None) {
        Err(ProviderError::UnknownVector { name }) => assert_eq!(name, "FWPT"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        provider.get_vectors_for_date_df(day(2020, 1, 1), &[REAL_COLUMN], None),
        Err(ProviderError::UnknownVector { .. })
    ));
    Ok(())
}

#[test]
fn duplicate_dates_are_rejected_on_write() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    let mut tables = BTreeMap::new();
    tables.insert(
        4,
        realization_table(
            &[ms(2020, 1, 1), ms(2020, 1, 2), ms(2020, 1, 2)],
            &[("TOT", vec![1.0, 2.0, 3.0])],
        ),
    );

    let err = LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location, "bad", &tables,
    )
    .unwrap_err();
    match err {
        BackingStoreError::NonMonotonicDates { realization, .. } => assert_eq!(realization, 4),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(LazyResamplingProvider::from_backing_store(&location, "bad")?.is_none());
    Ok(())
}

#[test]
fn value_filters_use_min_max_index() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    let mut tables = BTreeMap::new();
    tables.insert(
        0,
        realization_table(
            &[ms(2021, 1, 1), ms(2021, 2, 1), ms(2021, 3, 1)],
            &[
                ("ZERO", vec![0.0, 0.0, 0.0]),
                ("CONST", vec![5.0, 5.0, 5.0]),
                ("VARY", vec![1.0, 2.0, 3.0]),
            ],
        ),
    );
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location, "filters", &tables,
    )?;
    let provider = open_lazy(&location, "filters");

    assert_eq!(
        provider.vector_names_filtered_by_value(false, false),
        vec!["ZERO", "CONST", "VARY"]
    );
    assert_eq!(
        provider.vector_names_filtered_by_value(true, false),
        vec!["CONST", "VARY"]
    );
    assert_eq!(
        provider.vector_names_filtered_by_value(false, true),
        vec!["VARY"]
    );
    Ok(())
}

#[test]
fn rewriting_a_store_replaces_it() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location,
        "iter-0",
        &two_realizations(),
    )?;

    let mut smaller = BTreeMap::new();
    smaller.insert(
        9,
        realization_table(&[ms(2020, 6, 1)], &[("OTHER", vec![1.0])]),
    );
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location, "iter-0", &smaller,
    )?;

    let provider = open_lazy(&location, "iter-0");
    assert_eq!(provider.vector_names(), vec!["OTHER"]);
    assert_eq!(provider.realizations(), vec![9]);
    Ok(())
}

#[test]
fn lazy_queries_regroup_a_date_ordered_store() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    PresampledProvider::write_backing_store_from_per_realization_tables(
        &location,
        "by-date",
        &two_realizations(),
        None,
    )?;
    let provider = open_lazy(&location, "by-date");

    let at_date = provider.get_vectors_for_date_df(day(2020, 1, 2), &["TOT"], None)?;
    assert_eq!(real_values(&at_date)?, &[0, 2]);
    assert_eq!(f64_column(&at_date, "TOT"), vec![10.0, 5.0]);

    let daily = provider.get_vectors_df(
        &["TOT"],
        Some(ResamplingOptions::new(Frequency::Daily)),
        None,
    )?;
    assert_eq!(real_values(&daily)?, &[0, 0, 0, 2, 2]);
    assert_eq!(f64_column(&daily, "TOT"), vec![0.0, 10.0, 20.0, 5.0, 15.0]);
    Ok(())
}

#[test]
fn store_without_vectors_fails_to_open() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    let mut tables = BTreeMap::new();
    tables.insert(0, realization_table(&[ms(2020, 1, 1), ms(2020, 1, 2)], &[]));
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location, "dates-only", &tables,
    )?;

    assert!(matches!(
        LazyResamplingProvider::from_backing_store(&location, "dates-only"),
        Err(ProviderError::Store {
            source: BackingStoreError::NoVectors { .. }
        })
    ));
    assert!(matches!(
        PresampledProvider::from_backing_store(&location, "dates-only"),
        Err(ProviderError::Store {
            source: BackingStoreError::NoVectors { .. }
        })
    ));
    Ok(())
}

#[test]
fn store_without_rows_fails_to_open() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    let mut tables = BTreeMap::new();
    tables.insert(0, realization_table(&[], &[("TOT", vec![])]));
    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location, "empty", &tables,
    )?;

    match LazyResamplingProvider::from_backing_store(&location, "empty") {
        Err(ProviderError::Store {
            source: BackingStoreError::NoRealizations { path },
        }) => assert!(path.ends_with("empty.parquet")),
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

// =============================================================================
// Presampled provider
// =============================================================================

#[test]
fn presampled_store_is_date_ordered_and_rejects_resampling() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    PresampledProvider::write_backing_store_from_per_realization_tables(
        &location,
        "iter-0",
        &two_realizations(),
        Some(Frequency::Daily),
    )?;
    let provider = open_presampled(&location, "iter-0");
    assert!(!provider.supports_resampling());

    let table = provider.get_vectors_df(&["TOT"], None, None)?;
    assert_eq!(column_names(&table), vec![DATE_COLUMN, REAL_COLUMN, "TOT"]);
    assert_eq!(
        date_values(&table)?,
        &[
            ms(2020, 1, 1),
            ms(2020, 1, 2),
            ms(2020, 1, 2),
            ms(2020, 1, 3),
            ms(2020, 1, 3)
        ]
    );
    assert_eq!(real_values(&table)?, &[0, 0, 2, 0, 2]);
    assert_eq!(f64_column(&table, "TOT"), vec![0.0, 10.0, 5.0, 20.0, 15.0]);

    match provider.get_vectors_df(&["TOT"], Some(ResamplingOptions::new(Frequency::Monthly)), None) {
        Err(ProviderError::ResamplingNotSupported { frequency }) => {
            assert_eq!(frequency, Frequency::Monthly)
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        provider.dates(Some(Frequency::Daily), None, DateSpan::Union),
        Err(ProviderError::ResamplingNotSupported { .. })
    ));

    assert_eq!(
        provider.dates(None, None, DateSpan::Intersection)?,
        vec![day(2020, 1, 2), day(2020, 1, 3)]
    );
    assert_eq!(
        provider.dates(None, None, DateSpan::Union)?,
        vec![day(2020, 1, 1), day(2020, 1, 2), day(2020, 1, 3)]
    );
    Ok(())
}

#[test]
fn presampled_point_query_matches_grid_dates_only() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    PresampledProvider::write_backing_store_from_per_realization_tables(
        &location,
        "iter-0",
        &two_realizations(),
        Some(Frequency::Daily),
    )?;
    let provider = open_presampled(&location, "iter-0");

    let at_grid = provider.get_vectors_for_date_df(day(2020, 1, 2), &["TOT", "RATE"], None)?;
    assert_eq!(column_names(&at_grid), vec![REAL_COLUMN, "TOT", "RATE"]);
    assert_eq!(real_values(&at_grid)?, &[0, 2]);
    assert_eq!(f64_column(&at_grid, "TOT"), vec![10.0, 5.0]);

    let off_grid = provider.get_vectors_for_date_df(
        Utc.with_ymd_and_hms(2020, 1, 2, 6, 0, 0).unwrap(),
        &["TOT"],
        None,
    )?;
    assert_eq!(off_grid.num_rows(), 0);
    Ok(())
}

fn ensemble_dataframe(ensembles: &[&str]) -> RecordBatch {
    // Deliberately unsorted rows.
    let dates = vec![ms(2020, 2, 1), ms(2020, 1, 1), ms(2020, 1, 1), ms(2020, 2, 1)];
    let reals = vec![1_i64, 1, 0, 0];
    let tot = vec![11.0, 10.0, 0.0, 1.0];
    let ens: Vec<&str> = (0..dates.len())
        .map(|i| ensembles[i % ensembles.len()])
        .collect();

    let schema = Schema::new(vec![
        Field::new(
            DATE_COLUMN,
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
        Field::new(REAL_COLUMN, DataType::Int64, false),
        Field::new(ENSEMBLE_COLUMN, DataType::Utf8, false),
        vector_field("TOT", Some(&total_md("FOPT"))),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(TimestampMillisecondArray::from(dates)),
            Arc::new(Int64Array::from(reals)),
            Arc::new(StringArray::from(ens)),
            Arc::new(Float64Array::from(tot)),
        ],
    )
    .unwrap()
}

#[test]
fn presampled_from_ensemble_dataframe() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    PresampledProvider::write_backing_store_from_ensemble_dataframe(
        &location,
        "iter-0",
        &ensemble_dataframe(&["iter-0"]),
    )?;
    let provider = open_presampled(&location, "iter-0");

    assert_eq!(provider.vector_names(), vec!["TOT"]);
    assert_eq!(provider.realizations(), vec![0, 1]);
    assert_eq!(provider.vector_metadata("TOT"), Some(total_md("FOPT")));

    let table = provider.get_vectors_df(&["TOT"], None, None)?;
    assert_eq!(real_values(&table)?, &[0, 1, 0, 1]);
    assert_eq!(f64_column(&table, "TOT"), vec![0.0, 10.0, 1.0, 11.0]);
    Ok(())
}

#[test]
fn ensemble_dataframe_with_two_ensembles_is_rejected() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());
    let err = PresampledProvider::write_backing_store_from_ensemble_dataframe(
        &location,
        "iter-0",
        &ensemble_dataframe(&["iter-0", "iter-1"]),
    )
    .unwrap_err();
    match err {
        BackingStoreError::MultipleEnsembles { ensembles } => {
            assert_eq!(ensembles, vec!["iter-0", "iter-1"])
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

// =============================================================================
// Provider sets
// =============================================================================

#[test]
fn provider_set_over_stored_ensembles() -> TestResult {
    let tmp = TempDir::new()?;
    let location = StoreLocation::local(tmp.path());

    LazyResamplingProvider::write_backing_store_from_per_realization_tables(
        &location,
        "iter-0",
        &two_realizations(),
    )?;
    let mut other = BTreeMap::new();
    other.insert(
        5,
        realization_table(
            &[ms(2020, 1, 1)],
            &[("TOT", vec![1.0]), ("EXTRA", vec![2.0])],
        ),
    );
    PresampledProvider::write_backing_store_from_per_realization_tables(
        &location, "iter-1", &other, None,
    )?;

    let mut set = EnsembleSummaryProviderSet::new();
    set.insert("iter-0", Arc::new(open_lazy(&location, "iter-0")));
    set.insert("iter-1", Arc::new(open_presampled(&location, "iter-1")));

    assert_eq!(set.provider_names(), vec!["iter-0", "iter-1"]);
    assert_eq!(set.all_vector_names(), vec!["EXTRA", "RATE", "TOT"]);
    assert_eq!(set.all_realizations(), vec![0, 2, 5]);
    assert_eq!(set.vector_metadata("TOT"), Some(total_md("FOPT")));
    assert_eq!(set.vector_metadata("EXTRA"), None);
    set.verify_consistent_vector_metadata()?;

    assert!(set.provider("iter-1")?.get_vectors_df(&["EXTRA"], None, None)?.num_rows() == 1);
    assert!(set.provider("iter-2").is_err());
    Ok(())
}
