use super::Collection;
use super::list::List;
use crate::error::RecordError;
use crate::proto::{FieldDescriptor, Proto};
use crate::record::Record;
use crate::spooky_value::SpookyValue;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::convert::Infallible;
use std::sync::Arc;

// ─── Compacted ──────────────────────────────────────────────────────────────

/// Schema plus positional rows: many records of one shape in a flat form.
///
/// `rows[i][j]` is the value of `fields[j]`. A `Null` cell means the field
/// was not set, unless `(i, j)` is listed in `nulls`, in which case the
/// field was set to null. Rows may be shorter than the field list but never
/// longer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Compacted {
    pub fields: Vec<FieldDescriptor>,
    #[serde(alias = "data")]
    pub rows: Vec<Vec<SpookyValue>>,
    /// `(row, column)` of every cell holding an explicit null.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nulls: Vec<(usize, usize)>,
}

impl Compacted {
    pub fn new(fields: Vec<FieldDescriptor>, rows: Vec<Vec<SpookyValue>>) -> Self {
        Self {
            fields,
            rows,
            nulls: Vec::new(),
        }
    }

    /// Pack every record of a collection, in iteration order.
    pub fn from_collection<C: Collection>(collection: &C) -> Self {
        let proto = collection.proto();
        let mut rows: Vec<Vec<SpookyValue>> = Vec::new();
        let mut nulls = Vec::new();
        let Ok(()) = collection.for_each(|record| -> Result<bool, Infallible> {
            let r = rows.len();
            let row = (0..proto.size())
                .map(|i| match record.get_at(i) {
                    Some(SpookyValue::Null) => {
                        nulls.push((r, i));
                        SpookyValue::Null
                    }
                    Some(value) => value.clone(),
                    None => SpookyValue::Null,
                })
                .collect();
            rows.push(row);
            Ok(true)
        });
        Self {
            fields: proto.descriptors(),
            rows,
            nulls,
        }
    }

    /// Add fields missing from the collection's proto, then one record per
    /// row, in row order. Cells are matched to the target by field name.
    ///
    /// Either every row is added or, on error, the collection and its proto
    /// are left as they were. New fields need an unfrozen proto; the
    /// collection then switches to an extended fork of it.
    pub fn update<C: Collection>(&self, collection: &mut C) -> Result<(), RecordError> {
        let nulls = self.null_cells()?;

        let missing: Vec<FieldDescriptor> = self
            .fields
            .iter()
            .filter(|desc| collection.proto().field(&desc.name).is_none())
            .cloned()
            .collect();
        let proto = if missing.is_empty() {
            collection.proto().clone()
        } else {
            Arc::new(extend_proto(collection.proto(), missing)?)
        };

        log::debug!(
            "rehydrating {} rows into `{}` ({} fields)",
            self.rows.len(),
            proto.name(),
            proto.size()
        );
        let records = self.build_records(&proto, &nulls)?;
        if !Arc::ptr_eq(&proto, collection.proto()) {
            *collection.proto_slot() = proto;
        }
        for record in records {
            collection.add_record(record)?;
        }
        Ok(())
    }

    /// Rehydrate into a fresh list under a new proto built from `fields`.
    pub fn into_list(self, name: impl Into<SmolStr>) -> Result<List, RecordError> {
        let nulls = self.null_cells()?;
        let proto = Arc::new(Proto::build(name, self.fields.iter().cloned())?);
        let records = self.build_records(&proto, &nulls)?;
        List::with_records(proto, records)
    }

    /// Checks row lengths and collects the explicit-null cells.
    fn null_cells(&self) -> Result<FxHashSet<(usize, usize)>, RecordError> {
        let width = self.fields.len();
        if let Some(row) = self.rows.iter().find(|row| row.len() > width) {
            return Err(RecordError::RowArityMismatch {
                expected: width,
                actual: row.len(),
            });
        }
        let mut cells = FxHashSet::default();
        for &(row, column) in &self.nulls {
            if row >= self.rows.len() {
                return Err(RecordError::PositionOutOfRange {
                    position: row,
                    size: self.rows.len(),
                });
            }
            if column >= width {
                return Err(RecordError::PositionOutOfRange {
                    position: column,
                    size: width,
                });
            }
            cells.insert((row, column));
        }
        Ok(cells)
    }

    fn build_records(
        &self,
        proto: &Arc<Proto>,
        nulls: &FxHashSet<(usize, usize)>,
    ) -> Result<Vec<Record>, RecordError> {
        let positions = self
            .fields
            .iter()
            .map(|desc| proto.index_of(&desc.name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(self.rows.len());
        for (r, row) in self.rows.iter().enumerate() {
            let mut record = proto.new_record();
            for (c, &position) in positions.iter().enumerate() {
                match row.get(c) {
                    Some(cell) if !cell.is_null() => record.set_at(position, cell.clone())?,
                    _ if nulls.contains(&(r, c)) => record.set_at(position, SpookyValue::Null)?,
                    _ => {}
                }
            }
            records.push(record);
        }
        Ok(records)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, RecordError> {
        let mut buf = Vec::new();
        cbor4ii::serde::to_writer(&mut buf, self).map_err(|e| RecordError::Cbor(e.to_string()))?;
        Ok(buf)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, RecordError> {
        cbor4ii::serde::from_slice(bytes).map_err(|e| RecordError::Cbor(e.to_string()))
    }
}

fn extend_proto(current: &Proto, missing: Vec<FieldDescriptor>) -> Result<Proto, RecordError> {
    if current.is_frozen() {
        return Err(RecordError::SchemaFrozen {
            proto: SmolStr::from(current.name()),
        });
    }
    log::debug!("extending `{}` with {} fields", current.name(), missing.len());
    let mut proto = current.fork()?;
    for desc in missing {
        proto.add_field(desc)?;
    }
    Ok(proto)
}
