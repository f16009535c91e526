use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::metadata::VectorMetadata;
use crate::metadata::vector_metadata::with_vector_metadata;
use crate::table::access::{date_field, real_field};

/// Epoch millis of midnight on the given date.
pub fn ms(y: i32, m: u32, d: u32) -> i64 {
    ms_hm(y, m, d, 0, 0)
}

pub fn ms_hm(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid test date")
        .and_utc()
        .timestamp_millis()
}

pub fn rate(keyword: &str) -> VectorMetadata {
    VectorMetadata {
        unit: "SM3/DAY".to_string(),
        is_rate: true,
        keyword: keyword.to_string(),
        ..VectorMetadata::default()
    }
}

pub fn total(keyword: &str) -> VectorMetadata {
    VectorMetadata {
        unit: "SM3".to_string(),
        is_total: true,
        keyword: keyword.to_string(),
        ..VectorMetadata::default()
    }
}

/// Build a `DATE`[, `REAL`], Float64 vectors table.
pub fn make_table(
    dates: &[i64],
    reals: Option<&[i64]>,
    vectors: Vec<(&str, Vec<f64>, Option<VectorMetadata>)>,
) -> RecordBatch {
    let mut fields = vec![date_field()];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(TimestampMillisecondArray::from(dates.to_vec()))];

    if let Some(reals) = reals {
        fields.push(real_field());
        columns.push(Arc::new(Int64Array::from(reals.to_vec())));
    }

    for (name, values, md) in vectors {
        let mut field = Field::new(name, DataType::Float64, true);
        if let Some(md) = md {
            field = with_vector_metadata(&field, &md);
        }
        fields.push(field);
        columns.push(Arc::new(Float64Array::from(values)));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).expect("valid test table")
}
