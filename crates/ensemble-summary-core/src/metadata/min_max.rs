//! Per-vector min/max index.
//!
//! Computed once at write time over every floating-point column and stored
//! as JSON in the schema metadata, e.g.
//! `{"FOPT": {"min": 0.0, "max": 1250.5}}`. Readers use it to filter out
//! all-zero or constant vectors without scanning data pages.
use std::collections::{BTreeMap, HashMap};

use arrow::array::{Array, Float32Array, Float64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

/// Schema metadata key holding the JSON-encoded index.
pub const PER_VECTOR_MIN_MAX_KEY: &str = "ensemble_summary:per_vector_min_max";

/// Value range of one vector, ignoring nulls and non-finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl MinMax {
    /// All values are equal.
    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }

    /// All values are zero.
    pub fn is_all_zero(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// Min/max index keyed by vector name.
///
/// Vectors with no finite value (empty or all-null columns) have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerVectorMinMax(pub BTreeMap<String, MinMax>);

fn fold_min_max(values: impl Iterator<Item = f64>) -> Option<MinMax> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| {
        let mut mm = acc.unwrap_or(MinMax { min: v, max: v });
        mm.include(v);
        Some(mm)
    })
}

impl PerVectorMinMax {
    /// Compute the index over every `Float32`/`Float64` column of `table`.
    pub fn compute(table: &RecordBatch) -> Self {
        let mut out = BTreeMap::new();
        for (field, col) in table.schema_ref().fields().iter().zip(table.columns()) {
            let mm = match field.data_type() {
                DataType::Float64 => col
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .and_then(|arr| fold_min_max(arr.iter().flatten())),
                DataType::Float32 => col
                    .as_any()
                    .downcast_ref::<Float32Array>()
                    .and_then(|arr| fold_min_max(arr.iter().flatten().map(f64::from))),
                _ => None,
            };
            if let Some(mm) = mm {
                out.insert(field.name().clone(), mm);
            }
        }
        Self(out)
    }

    /// Look up one vector.
    pub fn get(&self, vector: &str) -> Option<&MinMax> {
        self.0.get(vector)
    }

    /// Serialize into `metadata` under [`PER_VECTOR_MIN_MAX_KEY`].
    pub fn insert_into_schema_metadata(
        &self,
        metadata: &mut HashMap<String, String>,
    ) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(self)?;
        metadata.insert(PER_VECTOR_MIN_MAX_KEY.to_string(), json);
        Ok(())
    }

    /// Parse the index from schema metadata.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn from_schema_metadata(
        metadata: &HashMap<String, String>,
    ) -> Result<Option<Self>, serde_json::Error> {
        metadata
            .get(PER_VECTOR_MIN_MAX_KEY)
            .map(|json| serde_json::from_str(json))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Int64Array};
    use arrow::datatypes::{Field, Schema};

    #[test]
    fn compute_skips_nulls_nan_and_non_float_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("REAL", DataType::Int64, false),
            Field::new("A", DataType::Float64, true),
            Field::new("B", DataType::Float32, true),
            Field::new("EMPTY", DataType::Float64, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(vec![0, 1, 2])),
            Arc::new(Float64Array::from(vec![Some(3.0), None, Some(f64::NAN)])),
            Arc::new(Float32Array::from(vec![Some(-1.0), Some(4.5), Some(0.0)])),
            Arc::new(Float64Array::from(vec![None::<f64>, None, None])),
        ];
        let table = RecordBatch::try_new(schema, columns).unwrap();

        let index = PerVectorMinMax::compute(&table);
        assert_eq!(index.get("A"), Some(&MinMax { min: 3.0, max: 3.0 }));
        assert_eq!(index.get("B"), Some(&MinMax { min: -1.0, max: 4.5 }));
        assert_eq!(index.get("REAL"), None);
        assert_eq!(index.get("EMPTY"), None);
        assert!(index.get("A").unwrap().is_constant());
    }

    #[test]
    fn schema_metadata_round_trip() {
        let index = PerVectorMinMax(BTreeMap::from([
            ("FOPT".to_string(), MinMax { min: 0.0, max: 10.0 }),
            ("FWPR".to_string(), MinMax { min: 0.0, max: 0.0 }),
        ]));
        let mut metadata = HashMap::new();
        index.insert_into_schema_metadata(&mut metadata).unwrap();

        let json = &metadata[PER_VECTOR_MIN_MAX_KEY];
        assert!(json.contains(r#""FOPT":{"min":0.0,"max":10.0}"#));

        let parsed = PerVectorMinMax::from_schema_metadata(&metadata).unwrap();
        assert_eq!(parsed, Some(index));
    }

    #[test]
    fn absent_key_parses_to_none() {
        assert_eq!(
            PerVectorMinMax::from_schema_metadata(&HashMap::new()).unwrap(),
            None
        );
    }

    #[test]
    fn all_zero_is_also_constant() {
        let mm = MinMax { min: 0.0, max: 0.0 };
        assert!(mm.is_all_zero());
        assert!(mm.is_constant());
        assert!(!MinMax { min: 0.0, max: 1.0 }.is_all_zero());
    }
}
