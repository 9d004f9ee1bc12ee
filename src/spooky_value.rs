use crate::collection::List;
use crate::record::Record;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::fmt;

pub type FastMap<K, V> = BTreeMap<K, V>;

// ─── SpookyNumber ───────────────────────────────────────────────────────────

/// Numeric payload. `Int` carries every integer kind narrower than 64 bits
/// (plus `isize`), `I64`/`U64` the 64-bit kinds.
#[derive(Clone, Copy, PartialEq)]
pub enum SpookyNumber {
    Int(i64),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl std::fmt::Debug for SpookyNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpookyNumber::Int(i) => write!(f, "Int({})", i),
            SpookyNumber::I64(i) => write!(f, "I64({})", i),
            SpookyNumber::U64(u) => write!(f, "U64({})", u),
            SpookyNumber::F32(v) => write!(f, "F32({})", v),
            SpookyNumber::F64(v) => write!(f, "F64({})", v),
        }
    }
}

impl SpookyNumber {
    pub fn as_f64(self) -> f64 {
        match self {
            SpookyNumber::Int(i) | SpookyNumber::I64(i) => i as f64,
            SpookyNumber::U64(u) => u as f64,
            SpookyNumber::F32(f) => f as f64,
            SpookyNumber::F64(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            SpookyNumber::Int(i) | SpookyNumber::I64(i) => i == 0,
            SpookyNumber::U64(u) => u == 0,
            SpookyNumber::F32(f) => f == 0.0,
            SpookyNumber::F64(f) => f == 0.0,
        }
    }

    pub(crate) fn kind_name(self) -> &'static str {
        match self {
            SpookyNumber::Int(_) => "int",
            SpookyNumber::I64(_) => "int64",
            SpookyNumber::U64(_) => "uint64",
            SpookyNumber::F32(_) => "float32",
            SpookyNumber::F64(_) => "float64",
        }
    }
}

// ─── SpookyValue ────────────────────────────────────────────────────────────

/// A dynamic value: what callers hand to `Record::set`, what record slots
/// store after coercion, and what compact rows carry.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SpookyValue {
    #[default]
    Null,
    Bool(bool),
    Number(SpookyNumber),
    Str(SmolStr),
    Bytes(Vec<u8>),
    Time(DateTime<Utc>),
    Array(Vec<SpookyValue>),
    Object(FastMap<SmolStr, SpookyValue>),
    Record(Box<Record>),
    List(Box<List>),
}

impl SpookyValue {
    pub fn as_object(&self) -> Option<&FastMap<SmolStr, SpookyValue>> {
        match self {
            SpookyValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            SpookyValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            SpookyValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SpookyValue::Null)
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SpookyValue::Null => "null",
            SpookyValue::Bool(_) => "bool",
            SpookyValue::Number(n) => n.kind_name(),
            SpookyValue::Str(_) => "string",
            SpookyValue::Bytes(_) => "bytes",
            SpookyValue::Time(_) => "time",
            SpookyValue::Array(_) => "array",
            SpookyValue::Object(_) => "object",
            SpookyValue::Record(_) => "record",
            SpookyValue::List(_) => "list",
        }
    }
}

// ─── Serialize ──────────────────────────────────────────────────────────────

impl Serialize for SpookyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SpookyValue::Null => serializer.serialize_none(),
            SpookyValue::Bool(b) => serializer.serialize_bool(*b),
            SpookyValue::Number(n) => match n {
                SpookyNumber::Int(i) | SpookyNumber::I64(i) => serializer.serialize_i64(*i),
                SpookyNumber::U64(u) => serializer.serialize_u64(*u),
                SpookyNumber::F32(f) => serializer.serialize_f32(*f),
                SpookyNumber::F64(f) => serializer.serialize_f64(*f),
            },
            SpookyValue::Str(s) => serializer.serialize_str(s.as_str()),
            SpookyValue::Bytes(b) => serializer.serialize_bytes(b),
            SpookyValue::Time(t) => {
                serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            SpookyValue::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for v in arr {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            SpookyValue::Object(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k.as_str(), v)?;
                }
                m.end()
            }
            SpookyValue::Record(record) => record.serialize(serializer),
            SpookyValue::List(list) => list.serialize(serializer),
        }
    }
}

// ─── Deserialize ────────────────────────────────────────────────────────────

struct SpookyValueVisitor;

impl<'de> Visitor<'de> for SpookyValueVisitor {
    type Value = SpookyValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any self-describing value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<SpookyValue, D::Error> {
        SpookyValue::deserialize(d)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Number(SpookyNumber::I64(i)))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<SpookyValue, E> {
        // Keep small unsigned values signed so they round-trip as I64.
        Ok(match i64::try_from(u) {
            Ok(i) => SpookyValue::Number(SpookyNumber::I64(i)),
            Err(_) => SpookyValue::Number(SpookyNumber::U64(u)),
        })
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Number(SpookyNumber::F64(f)))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Str(SmolStr::from(s)))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Str(SmolStr::from(s)))
    }

    fn visit_bytes<E: de::Error>(self, b: &[u8]) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Bytes(b.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, b: Vec<u8>) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Bytes(b))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SpookyValue, A::Error> {
        let mut arr = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(v) = seq.next_element()? {
            arr.push(v);
        }
        Ok(SpookyValue::Array(arr))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SpookyValue, A::Error> {
        let mut map = FastMap::new();
        while let Some((k, v)) = access.next_entry::<SmolStr, SpookyValue>()? {
            map.insert(k, v);
        }
        Ok(SpookyValue::Object(map))
    }
}

impl<'de> Deserialize<'de> for SpookyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SpookyValueVisitor)
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

macro_rules! from_narrow_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SpookyValue {
                fn from(n: $t) -> Self {
                    SpookyValue::Number(SpookyNumber::Int(n as i64))
                }
            }
        )*
    };
}

from_narrow_int!(i8, i16, i32, u8, u16, u32, isize);

impl From<usize> for SpookyValue {
    fn from(n: usize) -> Self {
        match i64::try_from(n) {
            Ok(i) => SpookyValue::Number(SpookyNumber::Int(i)),
            Err(_) => SpookyValue::Number(SpookyNumber::U64(n as u64)),
        }
    }
}

impl From<f32> for SpookyValue {
    fn from(n: f32) -> Self {
        SpookyValue::Number(SpookyNumber::F32(n))
    }
}

impl From<f64> for SpookyValue {
    fn from(n: f64) -> Self {
        SpookyValue::Number(SpookyNumber::F64(n))
    }
}

impl From<i64> for SpookyValue {
    fn from(n: i64) -> Self {
        SpookyValue::Number(SpookyNumber::I64(n))
    }
}

impl From<u64> for SpookyValue {
    fn from(n: u64) -> Self {
        SpookyValue::Number(SpookyNumber::U64(n))
    }
}

impl From<bool> for SpookyValue {
    fn from(b: bool) -> Self {
        SpookyValue::Bool(b)
    }
}

impl From<&str> for SpookyValue {
    fn from(s: &str) -> Self {
        SpookyValue::Str(SmolStr::from(s))
    }
}

impl From<String> for SpookyValue {
    fn from(s: String) -> Self {
        SpookyValue::Str(SmolStr::from(s))
    }
}

impl From<SmolStr> for SpookyValue {
    fn from(s: SmolStr) -> Self {
        SpookyValue::Str(s)
    }
}

impl From<Vec<u8>> for SpookyValue {
    fn from(b: Vec<u8>) -> Self {
        SpookyValue::Bytes(b)
    }
}

impl From<&[u8]> for SpookyValue {
    fn from(b: &[u8]) -> Self {
        SpookyValue::Bytes(b.to_vec())
    }
}

impl From<DateTime<Utc>> for SpookyValue {
    fn from(t: DateTime<Utc>) -> Self {
        SpookyValue::Time(t)
    }
}

impl From<Vec<SpookyValue>> for SpookyValue {
    fn from(arr: Vec<SpookyValue>) -> Self {
        SpookyValue::Array(arr)
    }
}

impl From<FastMap<SmolStr, SpookyValue>> for SpookyValue {
    fn from(map: FastMap<SmolStr, SpookyValue>) -> Self {
        SpookyValue::Object(map)
    }
}

impl From<Record> for SpookyValue {
    fn from(r: Record) -> Self {
        SpookyValue::Record(Box::new(r))
    }
}

impl From<List> for SpookyValue {
    fn from(l: List) -> Self {
        SpookyValue::List(Box::new(l))
    }
}

impl<T: Into<SpookyValue>> From<Option<T>> for SpookyValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SpookyValue::Null, Into::into)
    }
}

// ─── From serde_json::Value ────────────────────────────────────────────────

impl From<serde_json::Value> for SpookyValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => SpookyValue::Null,
            serde_json::Value::Bool(b) => SpookyValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SpookyValue::Number(SpookyNumber::I64(i))
                } else if let Some(u) = n.as_u64() {
                    SpookyValue::Number(SpookyNumber::U64(u))
                } else {
                    SpookyValue::Number(SpookyNumber::F64(n.as_f64().unwrap_or(0.0)))
                }
            }
            serde_json::Value::String(s) => SpookyValue::Str(SmolStr::from(s)),
            serde_json::Value::Array(arr) => {
                SpookyValue::Array(arr.into_iter().map(SpookyValue::from).collect())
            }
            serde_json::Value::Object(obj) => SpookyValue::Object(
                obj.into_iter()
                    .map(|(k, v)| (SmolStr::from(k), SpookyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
#[macro_export]
macro_rules! spooky_obj {
    ({ $($key:expr => $val:tt),* $(,)? }) => {{
        let mut map = $crate::spooky_value::FastMap::default();
        $(
            map.insert(
                ::smol_str::SmolStr::new($key),
                $crate::spooky_value::SpookyValue::from($crate::spooky_obj!(@value $val))
            );
        )*
        $crate::spooky_value::SpookyValue::Object(map)
    }};

    (@value { $($inner:tt)* }) => {
        $crate::spooky_obj!({ $($inner)* })
    };

    (@value $val:expr) => {
        $val
    };
}
