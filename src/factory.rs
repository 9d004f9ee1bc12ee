use crate::collection::{KeyProvider, List, MultiMap, UniqueMap};
use crate::error::RecordError;
use crate::proto::{FieldDescriptor, Proto, fields_from_sample, fields_from_value};
use crate::record::Record;
use crate::spooky_value::SpookyValue;
use serde::Serialize;
use smol_str::SmolStr;
use std::sync::Arc;

// ─── Factory ────────────────────────────────────────────────────────────────

/// Shared owner of a [`Proto`]; creates records and collections bound to it.
///
/// Fields can still be added through the factory until the first record is
/// created or the proto handle is cloned out.
#[derive(Debug, Clone)]
pub struct Factory {
    proto: Arc<Proto>,
}

impl Factory {
    pub fn new(proto: Proto) -> Self {
        Self {
            proto: Arc::new(proto),
        }
    }

    pub fn from_fields(
        name: impl Into<SmolStr>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, RecordError> {
        Proto::build(name, fields).map(Self::new)
    }

    /// Infer the proto from a sample map or record.
    pub fn from_value(name: impl Into<SmolStr>, sample: &SpookyValue) -> Result<Self, RecordError> {
        Self::from_fields(name, fields_from_value(sample)?)
    }

    /// Infer the proto from any serde-serializable sample.
    pub fn from_sample<T: Serialize>(name: impl Into<SmolStr>, sample: &T) -> Result<Self, RecordError> {
        Self::from_fields(name, fields_from_sample(sample)?)
    }

    #[inline]
    pub fn proto(&self) -> &Arc<Proto> {
        &self.proto
    }

    /// Exclusive access to the proto for schema changes.
    pub fn proto_mut(&mut self) -> Result<&mut Proto, RecordError> {
        let name = SmolStr::from(self.proto.name());
        if self.proto.is_frozen() {
            return Err(RecordError::SchemaFrozen { proto: name });
        }
        Arc::get_mut(&mut self.proto).ok_or(RecordError::SchemaFrozen { proto: name })
    }

    pub fn add_field(&mut self, desc: FieldDescriptor) -> Result<usize, RecordError> {
        self.proto_mut()?.add_field(desc)
    }

    // ─── Records ────────────────────────────────────────────────────────────

    #[inline]
    pub fn new_record(&self) -> Record {
        self.proto.new_record()
    }

    /// Record from a map value, or a copy of another record by field names.
    pub fn record_from(&self, source: &SpookyValue) -> Result<Record, RecordError> {
        let mut record = self.proto.new_record();
        record.set_from(source)?;
        Ok(record)
    }

    /// Record from any serde-serializable value with matching field names.
    pub fn record_from_serde<T: Serialize>(&self, source: &T) -> Result<Record, RecordError> {
        let value = SpookyValue::from(serde_json::to_value(source)?);
        self.record_from(&value)
    }

    /// Record from a JSON object.
    pub fn record_from_json(&self, json: &str) -> Result<Record, RecordError> {
        let value: SpookyValue = serde_json::from_str(json)?;
        self.record_from(&value)
    }

    // ─── Collections ────────────────────────────────────────────────────────

    pub fn new_list(&self) -> List {
        List::new(self.proto.clone())
    }

    pub fn list_of(&self, records: Vec<Record>) -> Result<List, RecordError> {
        List::with_records(self.proto.clone(), records)
    }

    pub fn new_unique_map(&self, key_provider: impl KeyProvider + 'static) -> UniqueMap {
        UniqueMap::new(self.proto.clone(), key_provider)
    }

    pub fn new_multimap(&self, key_provider: impl KeyProvider + 'static) -> MultiMap {
        MultiMap::new(self.proto.clone(), key_provider)
    }
}

impl From<Proto> for Factory {
    fn from(proto: Proto) -> Self {
        Self::new(proto)
    }
}
