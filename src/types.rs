use crate::spooky_value::{FastMap, SpookyNumber, SpookyValue};
use chrono::{DateTime, Utc};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasherDefault;

pub type FxMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Every known spelling of a field name (declared, input, output) → position.
pub type NameIndex = FxMap<SmolStr, usize>;

/// chrono layout equivalent of RFC 3339, the default for time fields.
pub const DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

// ─── FieldType ──────────────────────────────────────────────────────────────

/// Semantic type tag of a field. Determines native storage and zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Int64,
    #[serde(alias = "float")]
    Float32,
    Float64,
    Bool,
    String,
    Time,
    Bytes,
    Array,
    Object,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Int64 => "int64",
            FieldType::Float32 => "float32",
            FieldType::Float64 => "float64",
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Time => "time",
            FieldType::Bytes => "bytes",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(self, FieldType::Int | FieldType::Int64)
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, FieldType::Float32 | FieldType::Float64)
    }

    /// Object and Array fields hold nested values.
    #[inline]
    pub fn is_composite(self) -> bool {
        matches!(self, FieldType::Array | FieldType::Object)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Inference ──────────────────────────────────────────────────────────────

/// Classify a runtime value.
///
/// Never fails: a value that carries no type information (`Null`) is
/// classified as `String`. Callers that build protos from samples get a
/// warning logged when that happens.
pub fn infer_type(value: &SpookyValue) -> FieldType {
    match value {
        SpookyValue::Bool(_) => FieldType::Bool,
        SpookyValue::Number(n) => match n {
            SpookyNumber::Int(_) => FieldType::Int,
            SpookyNumber::I64(_) | SpookyNumber::U64(_) => FieldType::Int64,
            SpookyNumber::F32(_) => FieldType::Float32,
            SpookyNumber::F64(_) => FieldType::Float64,
        },
        SpookyValue::Str(_) => FieldType::String,
        SpookyValue::Bytes(_) => FieldType::Bytes,
        SpookyValue::Time(_) => FieldType::Time,
        SpookyValue::Array(_) | SpookyValue::List(_) => FieldType::Array,
        SpookyValue::Object(_) | SpookyValue::Record(_) => FieldType::Object,
        SpookyValue::Null => {
            log::warn!("can't classify a null value, falling back to string");
            FieldType::String
        }
    }
}

/// Component type of a sequence, inferred from its first element.
/// Empty sequences (and lists of records) have no scalar component type.
pub fn infer_component_type(value: &SpookyValue) -> Option<FieldType> {
    match value {
        SpookyValue::Array(arr) => arr.first().map(infer_type),
        SpookyValue::List(_) => Some(FieldType::Object),
        _ => None,
    }
}

/// Representational zero of a type. Used to lay out fresh records; never
/// handed out for an unset field.
pub fn zero_value(field_type: FieldType) -> SpookyValue {
    match field_type {
        FieldType::Int => SpookyValue::Number(SpookyNumber::Int(0)),
        FieldType::Int64 => SpookyValue::Number(SpookyNumber::I64(0)),
        FieldType::Float32 => SpookyValue::Number(SpookyNumber::F32(0.0)),
        FieldType::Float64 => SpookyValue::Number(SpookyNumber::F64(0.0)),
        FieldType::Bool => SpookyValue::Bool(false),
        FieldType::String => SpookyValue::Str(SmolStr::default()),
        FieldType::Time => SpookyValue::Time(DateTime::<Utc>::default()),
        FieldType::Bytes => SpookyValue::Bytes(Vec::new()),
        FieldType::Array => SpookyValue::Array(Vec::new()),
        FieldType::Object => SpookyValue::Object(FastMap::new()),
    }
}

/// Emptiness as seen by omit-empty: null, a zero scalar, an empty string or
/// byte string, the Unix epoch, or a zero-size composite.
pub fn is_empty_value(value: &SpookyValue) -> bool {
    match value {
        SpookyValue::Null => true,
        SpookyValue::Bool(b) => !*b,
        SpookyValue::Number(n) => n.is_zero(),
        SpookyValue::Str(s) => s.is_empty(),
        SpookyValue::Bytes(b) => b.is_empty(),
        SpookyValue::Time(t) => *t == DateTime::<Utc>::default(),
        SpookyValue::Array(arr) => arr.is_empty(),
        SpookyValue::Object(map) => map.is_empty(),
        SpookyValue::Record(r) => r.is_nil(),
        SpookyValue::List(l) => l.size() == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_integer_widths() {
        assert_eq!(infer_type(&SpookyValue::from(3i32)), FieldType::Int);
        assert_eq!(infer_type(&SpookyValue::from(3u8)), FieldType::Int);
        assert_eq!(infer_type(&SpookyValue::from(3usize)), FieldType::Int);
        assert_eq!(infer_type(&SpookyValue::from(3i64)), FieldType::Int64);
        assert_eq!(infer_type(&SpookyValue::from(3u64)), FieldType::Int64);
    }

    #[test]
    fn test_infer_floats_and_scalars() {
        assert_eq!(infer_type(&SpookyValue::from(1.5f32)), FieldType::Float32);
        assert_eq!(infer_type(&SpookyValue::from(1.5f64)), FieldType::Float64);
        assert_eq!(infer_type(&SpookyValue::from(true)), FieldType::Bool);
        assert_eq!(infer_type(&SpookyValue::from("x")), FieldType::String);
        assert_eq!(infer_type(&SpookyValue::from(vec![1u8, 2])), FieldType::Bytes);
        assert_eq!(
            infer_type(&SpookyValue::from(DateTime::<Utc>::default())),
            FieldType::Time
        );
    }

    #[test]
    fn test_infer_composites() {
        let arr = SpookyValue::Array(vec![SpookyValue::from(1.0f64)]);
        assert_eq!(infer_type(&arr), FieldType::Array);
        assert_eq!(infer_component_type(&arr), Some(FieldType::Float64));
        assert_eq!(infer_component_type(&SpookyValue::Array(vec![])), None);

        let obj = SpookyValue::Object(FastMap::new());
        assert_eq!(infer_type(&obj), FieldType::Object);
    }

    #[test]
    fn test_infer_null_falls_back_to_string() {
        assert_eq!(infer_type(&SpookyValue::Null), FieldType::String);
    }

    #[test]
    fn test_zero_values_are_empty() {
        for t in [
            FieldType::Int,
            FieldType::Int64,
            FieldType::Float32,
            FieldType::Float64,
            FieldType::Bool,
            FieldType::String,
            FieldType::Time,
            FieldType::Bytes,
            FieldType::Array,
            FieldType::Object,
        ] {
            assert!(is_empty_value(&zero_value(t)), "zero of {t} should be empty");
        }
        assert!(!is_empty_value(&SpookyValue::from(1i32)));
        assert!(!is_empty_value(&SpookyValue::from("a")));
    }

    #[test]
    fn test_field_type_tags() {
        let t: FieldType = serde_json::from_str("\"float\"").unwrap();
        assert_eq!(t, FieldType::Float32);
        assert_eq!(serde_json::to_string(&FieldType::Int64).unwrap(), "\"int64\"");
    }
}
