use crate::record::Record;
use crate::spooky_value::{SpookyNumber, SpookyValue};
use chrono::{DateTime, Utc};
use smol_str::SmolStr;
use std::cell::Cell;

// ─── Key ────────────────────────────────────────────────────────────────────

/// Hashable key derived from a record.
///
/// Integers of every width share one representation, so a key built from
/// `1i32` finds a record keyed by an Int64 field holding `1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// Bit pattern of the float, with `-0.0` folded into `0.0`.
    Float(u64),
    Str(SmolStr),
    Bytes(Vec<u8>),
    Time(DateTime<Utc>),
    Composite(Vec<Key>),
}

impl Key {
    pub fn from_value(value: &SpookyValue) -> Self {
        match value {
            SpookyValue::Null => Key::Null,
            SpookyValue::Bool(b) => Key::Bool(*b),
            SpookyValue::Number(n) => match *n {
                SpookyNumber::Int(i) | SpookyNumber::I64(i) => Key::Int(i),
                SpookyNumber::U64(u) => match i64::try_from(u) {
                    Ok(i) => Key::Int(i),
                    Err(_) => Key::UInt(u),
                },
                SpookyNumber::F32(f) => Key::float(f as f64),
                SpookyNumber::F64(f) => Key::float(f),
            },
            SpookyValue::Str(s) => Key::Str(s.clone()),
            SpookyValue::Bytes(b) => Key::Bytes(b.clone()),
            SpookyValue::Time(t) => Key::Time(*t),
            SpookyValue::Array(items) => Key::Composite(items.iter().map(Key::from_value).collect()),
            // Maps, records and lists key by their JSON rendering.
            composite => Key::Str(SmolStr::from(
                serde_json::to_string(composite).unwrap_or_default(),
            )),
        }
    }

    fn float(f: f64) -> Self {
        let f = if f == 0.0 { 0.0 } else { f };
        Key::Float(f.to_bits())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(SmolStr::from(s))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(SmolStr::from(s))
    }
}

impl From<SmolStr> for Key {
    fn from(s: SmolStr) -> Self {
        Key::Str(s)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i64)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

impl From<&SpookyValue> for Key {
    fn from(v: &SpookyValue) -> Self {
        Key::from_value(v)
    }
}

// ─── KeyProvider ────────────────────────────────────────────────────────────

/// Derives the key of a record for [`super::UniqueMap`] and
/// [`super::MultiMap`]. Must be pure: the same record always yields the
/// same key.
pub trait KeyProvider: Send {
    fn key(&self, record: &Record) -> Key;
}

impl<F> KeyProvider for F
where
    F: Fn(&Record) -> Key + Send,
{
    #[inline]
    fn key(&self, record: &Record) -> Key {
        self(record)
    }
}

// ─── FieldKey ───────────────────────────────────────────────────────────────

/// Keys a record by one field's value.
///
/// The field position is resolved on first use and reused for every record
/// of the same proto; a record of another proto triggers a fresh lookup.
/// An unknown field or an unset value yields [`Key::Null`].
#[derive(Debug)]
pub struct FieldKey {
    field: SmolStr,
    /// (proto id, position) of the last resolution.
    cached: Cell<Option<(u64, usize)>>,
}

impl FieldKey {
    pub fn new(field: impl Into<SmolStr>) -> Self {
        Self {
            field: field.into(),
            cached: Cell::new(None),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    fn position(&self, record: &Record) -> Option<usize> {
        let proto = record.proto();
        if let Some((id, position)) = self.cached.get()
            && id == proto.id()
        {
            return Some(position);
        }
        match proto.index_of(&self.field) {
            Ok(position) => {
                log::trace!(
                    "key field `{}` resolved to position {} in `{}`",
                    self.field,
                    position,
                    proto.name()
                );
                self.cached.set(Some((proto.id(), position)));
                Some(position)
            }
            Err(_) => {
                log::debug!("key field `{}` not found in `{}`", self.field, proto.name());
                None
            }
        }
    }
}

impl KeyProvider for FieldKey {
    fn key(&self, record: &Record) -> Key {
        self.position(record)
            .and_then(|position| record.get_at(position))
            .map_or(Key::Null, Key::from_value)
    }
}

// ─── CompositeKey ───────────────────────────────────────────────────────────

/// Keys a record by several fields at once.
#[derive(Debug)]
pub struct CompositeKey {
    parts: Vec<FieldKey>,
}

impl CompositeKey {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            parts: fields.into_iter().map(FieldKey::new).collect(),
        }
    }
}

impl KeyProvider for CompositeKey {
    fn key(&self, record: &Record) -> Key {
        Key::Composite(self.parts.iter().map(|part| part.key(record)).collect())
    }
}
