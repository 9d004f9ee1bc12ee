use crate::collection::List;
use crate::record::Record;
use crate::spooky_value::{SpookyNumber, SpookyValue};
use crate::types::FieldType;
use chrono::{DateTime, Utc};

// ─── Accessor ───────────────────────────────────────────────────────────────

/// Position-bound reader for one field.
///
/// Typed reads return `(value, true)` when the field is set and its value is
/// readable as the requested type, and `(zero, false)` otherwise. Integers
/// widen into larger integer kinds and into floats; nothing narrows.
///
/// An accessor belongs to the proto it was built by. Using it on a record of
/// another proto is checked via debug assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessor {
    proto_id: u64,
    position: usize,
    field_type: FieldType,
}

impl Accessor {
    pub(crate) fn new(proto_id: u64, position: usize, field_type: FieldType) -> Self {
        Self {
            proto_id,
            position,
            field_type,
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

    /// The raw slot, `None` when the field is unset.
    #[inline]
    pub fn value<'a>(&self, record: &'a Record) -> Option<&'a SpookyValue> {
        debug_assert_eq!(
            record.proto().id(),
            self.proto_id,
            "accessor used on a record of another proto"
        );
        record.get_at(self.position)
    }

    #[inline]
    pub fn int(&self, record: &Record) -> (i64, bool) {
        match self.value(record) {
            Some(SpookyValue::Number(SpookyNumber::Int(i) | SpookyNumber::I64(i))) => (*i, true),
            _ => (0, false),
        }
    }

    #[inline]
    pub fn int64(&self, record: &Record) -> (i64, bool) {
        self.int(record)
    }

    #[inline]
    pub fn uint64(&self, record: &Record) -> (u64, bool) {
        match self.value(record) {
            Some(SpookyValue::Number(SpookyNumber::Int(i) | SpookyNumber::I64(i))) if *i >= 0 => {
                (*i as u64, true)
            }
            Some(SpookyValue::Number(SpookyNumber::U64(u))) => (*u, true),
            _ => (0, false),
        }
    }

    #[inline]
    pub fn float32(&self, record: &Record) -> (f32, bool) {
        match self.value(record) {
            Some(SpookyValue::Number(SpookyNumber::F32(f))) => (*f, true),
            Some(SpookyValue::Number(SpookyNumber::Int(i))) if i.unsigned_abs() < (1 << 24) => {
                (*i as f32, true)
            }
            _ => (0.0, false),
        }
    }

    #[inline]
    pub fn float64(&self, record: &Record) -> (f64, bool) {
        match self.value(record) {
            Some(SpookyValue::Number(n)) => (n.as_f64(), true),
            _ => (0.0, false),
        }
    }

    #[inline]
    pub fn bool(&self, record: &Record) -> (bool, bool) {
        match self.value(record) {
            Some(SpookyValue::Bool(b)) => (*b, true),
            _ => (false, false),
        }
    }

    #[inline]
    pub fn str<'a>(&self, record: &'a Record) -> (&'a str, bool) {
        match self.value(record) {
            Some(SpookyValue::Str(s)) => (s.as_str(), true),
            _ => ("", false),
        }
    }

    pub fn time(&self, record: &Record) -> (DateTime<Utc>, bool) {
        match self.value(record) {
            Some(SpookyValue::Time(t)) => (*t, true),
            _ => (DateTime::<Utc>::default(), false),
        }
    }

    pub fn bytes<'a>(&self, record: &'a Record) -> (&'a [u8], bool) {
        match self.value(record) {
            Some(SpookyValue::Bytes(b)) => (b.as_slice(), true),
            _ => (&[], false),
        }
    }

    /// Nested record of an Object field.
    pub fn record<'a>(&self, record: &'a Record) -> Option<&'a Record> {
        self.value(record).and_then(SpookyValue::as_record)
    }

    /// Nested records of an Array field.
    pub fn list<'a>(&self, record: &'a Record) -> Option<&'a List> {
        self.value(record).and_then(SpookyValue::as_list)
    }
}
