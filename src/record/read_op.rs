use super::record::Record;
use crate::collection::List;
use crate::error::RecordError;
use crate::proto::Field;
use crate::spooky_value::{FastMap, SpookyValue};
use crate::types::DEFAULT_TIME_LAYOUT;
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use smol_str::SmolStr;

/// Projection of a record: output name → value, in field order.
pub type OutputMap = Vec<(SmolStr, SpookyValue)>;

impl Record {
    // ════════════════════════════════════════════════════════════════════════
    // Raw reads
    // ════════════════════════════════════════════════════════════════════════

    /// Value of a field by any of its names; `None` when unset.
    pub fn get(&self, name: &str) -> Result<Option<&SpookyValue>, RecordError> {
        let position = self.proto.index_of(name)?;
        Ok(self.get_at(position))
    }

    /// Value at a position; `None` when unset or out of range.
    #[inline]
    pub fn get_at(&self, position: usize) -> Option<&SpookyValue> {
        if self.set_mask.get(position) {
            self.values.get(position)
        } else {
            None
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Typed reads by name
    // ════════════════════════════════════════════════════════════════════════

    pub fn get_int(&self, name: &str) -> Result<(i64, bool), RecordError> {
        Ok(self.proto.accessor(name)?.int(self))
    }

    pub fn get_int64(&self, name: &str) -> Result<(i64, bool), RecordError> {
        Ok(self.proto.accessor(name)?.int64(self))
    }

    pub fn get_uint64(&self, name: &str) -> Result<(u64, bool), RecordError> {
        Ok(self.proto.accessor(name)?.uint64(self))
    }

    pub fn get_float32(&self, name: &str) -> Result<(f32, bool), RecordError> {
        Ok(self.proto.accessor(name)?.float32(self))
    }

    pub fn get_float64(&self, name: &str) -> Result<(f64, bool), RecordError> {
        Ok(self.proto.accessor(name)?.float64(self))
    }

    pub fn get_bool(&self, name: &str) -> Result<(bool, bool), RecordError> {
        Ok(self.proto.accessor(name)?.bool(self))
    }

    pub fn get_str(&self, name: &str) -> Result<(&str, bool), RecordError> {
        Ok(self.proto.accessor(name)?.str(self))
    }

    pub fn get_time(&self, name: &str) -> Result<(DateTime<Utc>, bool), RecordError> {
        Ok(self.proto.accessor(name)?.time(self))
    }

    pub fn get_bytes(&self, name: &str) -> Result<(&[u8], bool), RecordError> {
        Ok(self.proto.accessor(name)?.bytes(self))
    }

    pub fn get_record(&self, name: &str) -> Result<Option<&Record>, RecordError> {
        Ok(self.proto.accessor(name)?.record(self))
    }

    pub fn get_list(&self, name: &str) -> Result<Option<&List>, RecordError> {
        Ok(self.proto.accessor(name)?.list(self))
    }

    // ─── Typed reads by position ────────────────────────────────────────────

    #[inline]
    pub fn int_at(&self, position: usize) -> (i64, bool) {
        self.proto
            .accessor_at(position)
            .map_or((0, false), |a| a.int(self))
    }

    #[inline]
    pub fn float64_at(&self, position: usize) -> (f64, bool) {
        self.proto
            .accessor_at(position)
            .map_or((0.0, false), |a| a.float64(self))
    }

    #[inline]
    pub fn bool_at(&self, position: usize) -> (bool, bool) {
        self.proto
            .accessor_at(position)
            .map_or((false, false), |a| a.bool(self))
    }

    #[inline]
    pub fn str_at(&self, position: usize) -> (&str, bool) {
        match self.proto.accessor_at(position) {
            Some(a) => a.str(self),
            None => ("", false),
        }
    }

    pub fn time_at(&self, position: usize) -> (DateTime<Utc>, bool) {
        self.proto
            .accessor_at(position)
            .map_or((DateTime::<Utc>::default(), false), |a| a.time(self))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Projection
    // ════════════════════════════════════════════════════════════════════════

    /// Fields that take part in projections: set, not hidden, and not
    /// dropped by omit-empty.
    pub fn visible_fields(&self) -> impl Iterator<Item = (&Field, &SpookyValue)> {
        let proto = &*self.proto;
        proto.fields().iter().filter_map(move |field| {
            let value = self.get_at(field.position())?;
            if field.is_hidden() || field.omits(proto, value) {
                return None;
            }
            Some((field, value))
        })
    }

    pub fn as_map(&self) -> OutputMap {
        self.visible_fields()
            .map(|(field, value)| (SmolStr::from(field.output_name()), value.clone()))
            .collect()
    }

    /// The projection as an `Object` value.
    pub fn to_value(&self) -> SpookyValue {
        let map: FastMap<SmolStr, SpookyValue> = self.as_map().into_iter().collect();
        SpookyValue::Object(map)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ─── Serialize ──────────────────────────────────────────────────────────────

/// A projected value, with time fields rendered in their layout.
struct FieldValue<'a> {
    layout: &'a str,
    value: &'a SpookyValue,
}

impl Serialize for FieldValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            SpookyValue::Time(t) if self.layout != DEFAULT_TIME_LAYOUT => {
                serializer.collect_str(&t.format(self.layout))
            }
            other => other.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proto = &*self.proto;
        let entries: Vec<_> = self.visible_fields().collect();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (field, value) in entries {
            let layout = field.time_layout(proto);
            map.serialize_entry(field.output_name(), &FieldValue { layout, value })?;
        }
        map.end()
    }
}
