use super::field::Field;
use super::prototype::Proto;
use crate::collection::List;
use crate::error::RecordError;
use crate::record::Record;
use crate::spooky_value::{SpookyNumber, SpookyValue};
use crate::types::{DEFAULT_TIME_LAYOUT, FieldType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;

/// Converts a caller value into a field's native representation.
pub(crate) type Coerce = fn(&Proto, &Field, SpookyValue) -> Result<SpookyValue, RecordError>;

// ─── Mutator ────────────────────────────────────────────────────────────────

/// Position-bound writer for one field. The coercion for the field's type is
/// picked once, when the field is added.
#[derive(Clone, Copy)]
pub struct Mutator {
    proto_id: u64,
    position: usize,
    field_type: FieldType,
    coerce: Coerce,
}

impl fmt::Debug for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutator")
            .field("position", &self.position)
            .field("field_type", &self.field_type)
            .finish()
    }
}

impl Mutator {
    pub(crate) fn new(proto_id: u64, position: usize, field_type: FieldType) -> Self {
        Self {
            proto_id,
            position,
            field_type,
            coerce: coerce_fn(field_type),
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Coerce without storing.
    pub(crate) fn prepare(&self, record: &Record, value: SpookyValue) -> Result<SpookyValue, RecordError> {
        debug_assert_eq!(
            record.proto().id(),
            self.proto_id,
            "mutator used on a record of another proto"
        );
        let proto = record.proto();
        (self.coerce)(proto, &proto.fields()[self.position], value)
    }

    /// Coerce `value` into the field's type and mark the field set. On error
    /// the record is left untouched.
    pub fn set(&self, record: &mut Record, value: impl Into<SpookyValue>) -> Result<(), RecordError> {
        let value = self.prepare(record, value.into())?;
        record.store(self.position, value);
        Ok(())
    }

    #[inline]
    pub fn int(&self, record: &mut Record, value: i64) -> Result<(), RecordError> {
        if self.field_type == FieldType::Int {
            record.store(self.position, SpookyValue::Number(SpookyNumber::Int(value)));
            return Ok(());
        }
        self.set(record, SpookyValue::Number(SpookyNumber::I64(value)))
    }

    #[inline]
    pub fn int64(&self, record: &mut Record, value: i64) -> Result<(), RecordError> {
        self.set(record, SpookyValue::Number(SpookyNumber::I64(value)))
    }

    #[inline]
    pub fn float32(&self, record: &mut Record, value: f32) -> Result<(), RecordError> {
        self.set(record, SpookyValue::Number(SpookyNumber::F32(value)))
    }

    #[inline]
    pub fn float64(&self, record: &mut Record, value: f64) -> Result<(), RecordError> {
        if self.field_type == FieldType::Float64 {
            record.store(self.position, SpookyValue::Number(SpookyNumber::F64(value)));
            return Ok(());
        }
        self.set(record, SpookyValue::Number(SpookyNumber::F64(value)))
    }

    #[inline]
    pub fn bool(&self, record: &mut Record, value: bool) -> Result<(), RecordError> {
        self.set(record, SpookyValue::Bool(value))
    }

    #[inline]
    pub fn str(&self, record: &mut Record, value: &str) -> Result<(), RecordError> {
        if self.field_type == FieldType::String {
            record.store(self.position, SpookyValue::Str(SmolStr::from(value)));
            return Ok(());
        }
        self.set(record, SpookyValue::Str(SmolStr::from(value)))
    }

    pub fn time(&self, record: &mut Record, value: DateTime<Utc>) -> Result<(), RecordError> {
        self.set(record, SpookyValue::Time(value))
    }

    pub fn bytes(&self, record: &mut Record, value: Vec<u8>) -> Result<(), RecordError> {
        self.set(record, SpookyValue::Bytes(value))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Coercion
// ════════════════════════════════════════════════════════════════════════════

pub(crate) fn coerce_fn(field_type: FieldType) -> Coerce {
    match field_type {
        FieldType::Int => coerce_int,
        FieldType::Int64 => coerce_int64,
        FieldType::Float32 => coerce_float32,
        FieldType::Float64 => coerce_float64,
        FieldType::Bool => coerce_bool,
        FieldType::String => coerce_string,
        FieldType::Time => coerce_time,
        FieldType::Bytes => coerce_bytes,
        FieldType::Array => coerce_array,
        FieldType::Object => coerce_object,
    }
}

fn mismatch(field: &Field, expected: FieldType, value: &SpookyValue) -> RecordError {
    RecordError::TypeMismatch {
        field: field.name.clone(),
        expected,
        actual: value.kind_name(),
    }
}

/// Any integer in `i64` range, or a finite float truncated toward zero.
fn to_i64(field: &Field, expected: FieldType, value: &SpookyValue) -> Result<i64, RecordError> {
    let SpookyValue::Number(n) = value else {
        return Err(mismatch(field, expected, value));
    };
    let converted = match *n {
        SpookyNumber::Int(i) | SpookyNumber::I64(i) => Some(i),
        SpookyNumber::U64(u) => i64::try_from(u).ok(),
        SpookyNumber::F32(f) => truncate(f as f64),
        SpookyNumber::F64(f) => truncate(f),
    };
    converted.ok_or_else(|| mismatch(field, expected, value))
}

fn truncate(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f.trunc() as i64)
}

fn coerce_int(_: &Proto, field: &Field, value: SpookyValue) -> Result<SpookyValue, RecordError> {
    if value.is_null() {
        return Ok(value);
    }
    to_i64(field, FieldType::Int, &value).map(|i| SpookyValue::Number(SpookyNumber::Int(i)))
}

fn coerce_int64(_: &Proto, field: &Field, value: SpookyValue) -> Result<SpookyValue, RecordError> {
    if value.is_null() {
        return Ok(value);
    }
    to_i64(field, FieldType::Int64, &value).map(|i| SpookyValue::Number(SpookyNumber::I64(i)))
}

fn coerce_float32(_: &Proto, field: &Field, value: SpookyValue) -> Result<SpookyValue, RecordError> {
    match value {
        SpookyValue::Null => Ok(value),
        SpookyValue::Number(n) => {
            let f = n.as_f64();
            if f.is_finite() && f.abs() > f32::MAX as f64 {
                return Err(mismatch(field, FieldType::Float32, &value));
            }
            Ok(SpookyValue::Number(SpookyNumber::F32(f as f32)))
        }
        other => Err(mismatch(field, FieldType::Float32, &other)),
    }
}

fn coerce_float64(_: &Proto, field: &Field, value: SpookyValue) -> Result<SpookyValue, RecordError> {
    match value {
        SpookyValue::Null => Ok(value),
        SpookyValue::Number(n) => Ok(SpookyValue::Number(SpookyNumber::F64(n.as_f64()))),
        other => Err(mismatch(field, FieldType::Float64, &other)),
    }
}

fn coerce_bool(_: &Proto, field: &Field, value: SpookyValue) -> Result<SpookyValue, RecordError> {
    match value {
        SpookyValue::Null | SpookyValue::Bool(_) => Ok(value),
        other => Err(mismatch(field, FieldType::Bool, &other)),
    }
}

fn coerce_string(_: &Proto, field: &Field, value: SpookyValue) -> Result<SpookyValue, RecordError> {
    match value {
        SpookyValue::Null | SpookyValue::Str(_) => Ok(value),
        other => Err(mismatch(field, FieldType::String, &other)),
    }
}

fn coerce_time(proto: &Proto, field: &Field, value: SpookyValue) -> Result<SpookyValue, RecordError> {
    match value {
        SpookyValue::Null | SpookyValue::Time(_) => Ok(value),
        SpookyValue::Str(ref s) => parse_time(s, field.time_layout(proto))
            .map(SpookyValue::Time)
            .ok_or_else(|| mismatch(field, FieldType::Time, &value)),
        other => Err(mismatch(field, FieldType::Time, &other)),
    }
}

/// Parse with a chrono layout, falling back to RFC 3339. Layouts without an
/// offset are read as UTC; date-only layouts as midnight UTC.
pub(crate) fn parse_time(s: &str, layout: &str) -> Option<DateTime<Utc>> {
    if layout == DEFAULT_TIME_LAYOUT {
        return DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(s, layout) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, layout) {
        return Some(t.and_utc());
    }
    if let Some(t) = NaiveDate::parse_from_str(s, layout)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Some(t.and_utc());
    }
    // Values that went through a generic serializer come back as RFC 3339.
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn coerce_bytes(_: &Proto, field: &Field, value: SpookyValue) -> Result<SpookyValue, RecordError> {
    match value {
        SpookyValue::Null | SpookyValue::Bytes(_) => Ok(value),
        SpookyValue::Str(s) => Ok(SpookyValue::Bytes(s.as_bytes().to_vec())),
        // JSON carries bytes as a sequence of numbers.
        SpookyValue::Array(ref items) => items
            .iter()
            .map(|item| match item {
                SpookyValue::Number(n) => to_byte(*n),
                _ => None,
            })
            .collect::<Option<Vec<u8>>>()
            .map(SpookyValue::Bytes)
            .ok_or_else(|| mismatch(field, FieldType::Bytes, &value)),
        other => Err(mismatch(field, FieldType::Bytes, &other)),
    }
}

fn to_byte(n: SpookyNumber) -> Option<u8> {
    match n {
        SpookyNumber::Int(i) | SpookyNumber::I64(i) => u8::try_from(i).ok(),
        SpookyNumber::U64(u) => u8::try_from(u).ok(),
        SpookyNumber::F32(_) | SpookyNumber::F64(_) => None,
    }
}

fn coerce_object(_: &Proto, field: &Field, value: SpookyValue) -> Result<SpookyValue, RecordError> {
    match value {
        SpookyValue::Record(ref record) => {
            let foreign = field
                .nested()
                .is_some_and(|nested| !Arc::ptr_eq(nested, record.proto()));
            if foreign {
                return Err(mismatch(field, FieldType::Object, &value));
            }
            Ok(value)
        }
        SpookyValue::Null => Ok(value),
        SpookyValue::Object(map) => match field.nested() {
            Some(nested) => {
                let mut record = nested.new_record();
                record.set_map(&map)?;
                Ok(SpookyValue::from(record))
            }
            None => Ok(SpookyValue::Object(map)),
        },
        other => Err(mismatch(field, FieldType::Object, &other)),
    }
}

fn coerce_array(proto: &Proto, field: &Field, value: SpookyValue) -> Result<SpookyValue, RecordError> {
    match value {
        SpookyValue::Null | SpookyValue::List(_) => Ok(value),
        SpookyValue::Array(items) => {
            if let Some(nested) = field.nested() {
                let mut list = List::new(nested.clone());
                for item in items {
                    list.add_value(&item)?;
                }
                return Ok(SpookyValue::from(list));
            }
            match field.component_type() {
                Some(component) => {
                    let coerce = coerce_fn(component);
                    let items = items
                        .into_iter()
                        .map(|item| coerce(proto, field, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(SpookyValue::Array(items))
                }
                None => Ok(SpookyValue::Array(items)),
            }
        }
        other => Err(mismatch(field, FieldType::Array, &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_bounds() {
        assert_eq!(truncate(2.9), Some(2));
        assert_eq!(truncate(-2.9), Some(-2));
        assert_eq!(truncate(f64::NAN), None);
        assert_eq!(truncate(f64::INFINITY), None);
        assert_eq!(truncate(1e19), None);
    }

    #[test]
    fn test_parse_time_layouts() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            parse_time("2024-03-01T12:30:00Z", DEFAULT_TIME_LAYOUT),
            Some(expected)
        );
        assert_eq!(
            parse_time("2024-03-01 12:30:00", "%Y-%m-%d %H:%M:%S"),
            Some(expected)
        );
        assert_eq!(
            parse_time("2024-03-01", "%Y-%m-%d"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_time("yesterday", "%Y-%m-%d"), None);
    }
}
