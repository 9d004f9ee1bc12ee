use super::record::Record;
use crate::error::RecordError;
use crate::spooky_value::{FastMap, SpookyValue};
use smol_str::SmolStr;

impl Record {
    // ════════════════════════════════════════════════════════════════════════
    // Single field
    // ════════════════════════════════════════════════════════════════════════

    /// Set a field by any of its names.
    pub fn set(&mut self, name: &str, value: impl Into<SpookyValue>) -> Result<(), RecordError> {
        let mutator = *self.proto.mutator(name)?;
        mutator.set(self, value)
    }

    pub fn set_at(&mut self, position: usize, value: impl Into<SpookyValue>) -> Result<(), RecordError> {
        let mutator = *self
            .proto
            .mutator_at(position)
            .ok_or(RecordError::PositionOutOfRange {
                position,
                size: self.values.len(),
            })?;
        mutator.set(self, value)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Bulk
    // ════════════════════════════════════════════════════════════════════════
    // Every bulk write coerces all values first and stores them only when
    // each one succeeded.

    /// Set fields from a name → value map.
    pub fn set_map(&mut self, values: &FastMap<SmolStr, SpookyValue>) -> Result<(), RecordError> {
        let mut staged = Vec::with_capacity(values.len());
        for (name, value) in values {
            let mutator = self.proto.mutator(name)?;
            staged.push((mutator.position(), mutator.prepare(self, value.clone())?));
        }
        self.commit(staged);
        Ok(())
    }

    /// Set fields from a map value or from another record's set fields,
    /// matched by name.
    pub fn set_from(&mut self, source: &SpookyValue) -> Result<(), RecordError> {
        match source {
            SpookyValue::Object(map) => self.set_map(map),
            SpookyValue::Record(other) => {
                let map: FastMap<SmolStr, SpookyValue> = other
                    .proto
                    .fields()
                    .iter()
                    .filter_map(|f| {
                        other
                            .get_at(f.position())
                            .map(|v| (f.name.clone(), v.clone()))
                    })
                    .collect();
                self.set_map(&map)
            }
            other => Err(RecordError::UnsupportedSource(other.kind_name())),
        }
    }

    /// Set fields positionally. `Null` entries are stored as null.
    pub fn set_values(&mut self, values: Vec<SpookyValue>) -> Result<(), RecordError> {
        self.set_positional(values, false)
    }

    /// Set fields positionally, leaving the field unset for `Null` entries.
    pub fn set_row(&mut self, values: Vec<SpookyValue>) -> Result<(), RecordError> {
        self.set_positional(values, true)
    }

    fn set_positional(&mut self, values: Vec<SpookyValue>, skip_null: bool) -> Result<(), RecordError> {
        if values.len() > self.values.len() {
            return Err(RecordError::RowArityMismatch {
                expected: self.values.len(),
                actual: values.len(),
            });
        }
        let mut staged = Vec::with_capacity(values.len());
        for (position, value) in values.into_iter().enumerate() {
            if skip_null && value.is_null() {
                continue;
            }
            let mutator = self
                .proto
                .mutator_at(position)
                .ok_or(RecordError::PositionOutOfRange {
                    position,
                    size: self.values.len(),
                })?;
            staged.push((position, mutator.prepare(self, value)?));
        }
        self.commit(staged);
        Ok(())
    }

    fn commit(&mut self, staged: Vec<(usize, SpookyValue)>) {
        for (position, value) in staged {
            self.store(position, value);
        }
    }
}
