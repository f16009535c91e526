//! Per-vector metadata stored as Arrow field metadata.
//!
//! Every value is encoded as a string under a fixed key. Booleans use the
//! `"True"`/`"False"` spelling; `wgname` and `get_num` are omitted when
//! absent. A field without any of the keys has no metadata, which is valid
//! and means the vector is interpolated as a non-rate quantity.
use std::collections::HashMap;

use arrow::datatypes::Field;
use serde::{Deserialize, Serialize};

const UNIT_KEY: &str = "unit";
const IS_TOTAL_KEY: &str = "is_total";
const IS_RATE_KEY: &str = "is_rate";
const IS_HISTORICAL_KEY: &str = "is_historical";
const KEYWORD_KEY: &str = "keyword";
const WGNAME_KEY: &str = "wgname";
const GET_NUM_KEY: &str = "get_num";

const ALL_KEYS: [&str; 7] = [
    UNIT_KEY,
    IS_TOTAL_KEY,
    IS_RATE_KEY,
    IS_HISTORICAL_KEY,
    KEYWORD_KEY,
    WGNAME_KEY,
    GET_NUM_KEY,
];

/// Descriptive metadata of one summary vector.
///
/// A vector may be a rate, a total, or neither. Rates are resampled with
/// backfill; everything else linearly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VectorMetadata {
    /// Physical unit, e.g. `SM3/DAY`.
    pub unit: String,
    /// Cumulative quantity.
    pub is_total: bool,
    /// Rate quantity.
    pub is_rate: bool,
    /// Historical (observed) rather than simulated vector.
    pub is_historical: bool,
    /// Summary keyword, e.g. `WOPR`.
    pub keyword: String,
    /// Well or group name, if the keyword refers to one.
    pub wgname: Option<String>,
    /// Numeric qualifier (region, block, ...), if the keyword has one.
    pub get_num: Option<i64>,
}

fn encode_bool(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

fn decode_bool(value: Option<&String>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

impl VectorMetadata {
    /// Encode as Arrow field metadata.
    pub fn to_field_metadata(&self) -> HashMap<String, String> {
        let mut out = HashMap::with_capacity(ALL_KEYS.len());
        out.insert(UNIT_KEY.to_string(), self.unit.clone());
        out.insert(IS_TOTAL_KEY.to_string(), encode_bool(self.is_total));
        out.insert(IS_RATE_KEY.to_string(), encode_bool(self.is_rate));
        out.insert(IS_HISTORICAL_KEY.to_string(), encode_bool(self.is_historical));
        out.insert(KEYWORD_KEY.to_string(), self.keyword.clone());
        if let Some(wgname) = &self.wgname {
            out.insert(WGNAME_KEY.to_string(), wgname.clone());
        }
        if let Some(num) = self.get_num {
            out.insert(GET_NUM_KEY.to_string(), num.to_string());
        }
        out
    }

    /// Decode from Arrow field metadata.
    ///
    /// Returns `None` when none of the vector metadata keys are present.
    /// Missing individual keys fall back to their defaults; an unparseable
    /// `get_num` is treated as absent.
    pub fn from_field_metadata(metadata: &HashMap<String, String>) -> Option<Self> {
        if !ALL_KEYS.iter().any(|k| metadata.contains_key(*k)) {
            return None;
        }

        Some(Self {
            unit: metadata.get(UNIT_KEY).cloned().unwrap_or_default(),
            is_total: decode_bool(metadata.get(IS_TOTAL_KEY)),
            is_rate: decode_bool(metadata.get(IS_RATE_KEY)),
            is_historical: decode_bool(metadata.get(IS_HISTORICAL_KEY)),
            keyword: metadata.get(KEYWORD_KEY).cloned().unwrap_or_default(),
            wgname: metadata.get(WGNAME_KEY).filter(|s| !s.is_empty()).cloned(),
            get_num: metadata.get(GET_NUM_KEY).and_then(|s| s.parse().ok()),
        })
    }

    /// Decode the metadata attached to `field`.
    pub fn from_field(field: &Field) -> Option<Self> {
        Self::from_field_metadata(field.metadata())
    }
}

/// Returns `true` if `field` is tagged as a rate vector.
///
/// Fields without metadata are not rates.
pub fn is_rate_from_field(field: &Field) -> bool {
    decode_bool(field.metadata().get(IS_RATE_KEY))
}

/// Return a copy of `field` with `metadata` replacing its vector metadata keys.
///
/// Unrelated field metadata entries are preserved.
pub fn with_vector_metadata(field: &Field, metadata: &VectorMetadata) -> Field {
    let mut merged: HashMap<String, String> = field
        .metadata()
        .iter()
        .filter(|(k, _)| !ALL_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    merged.extend(metadata.to_field_metadata());
    field.clone().with_metadata(merged)
}
