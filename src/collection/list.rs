use super::Collection;
use crate::error::RecordError;
use crate::proto::Proto;
use crate::record::Record;
use crate::spooky_value::SpookyValue;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::sync::Arc;

// ─── List ───────────────────────────────────────────────────────────────────

/// Ordered records of one proto.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    proto: Arc<Proto>,
    records: Vec<Record>,
}

impl List {
    pub fn new(proto: Arc<Proto>) -> Self {
        Self {
            proto,
            records: Vec::new(),
        }
    }

    pub fn with_records(proto: Arc<Proto>, records: Vec<Record>) -> Result<Self, RecordError> {
        let mut list = Self::new(proto);
        list.records.reserve(records.len());
        for record in records {
            list.append(record)?;
        }
        Ok(list)
    }

    #[inline]
    pub fn proto(&self) -> &Arc<Proto> {
        &self.proto
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.records.iter_mut()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn append(&mut self, record: Record) -> Result<(), RecordError> {
        check_proto(&self.proto, &record)?;
        self.records.push(record);
        Ok(())
    }

    /// Build a record from positional values and append it. `Null` cells
    /// leave their field unset.
    pub fn append_from_values(&mut self, values: Vec<SpookyValue>) -> Result<&mut Record, RecordError> {
        let mut record = self.proto.new_record();
        record.set_row(values)?;
        self.records.push(record);
        let last = self.records.len() - 1;
        Ok(&mut self.records[last])
    }

    /// Build a record from a map (or copy a record by field names) and
    /// append it.
    pub fn add_value(&mut self, value: &SpookyValue) -> Result<(), RecordError> {
        if let SpookyValue::Record(record) = value
            && Arc::ptr_eq(record.proto(), &self.proto)
        {
            self.records.push(record.as_ref().clone());
            return Ok(());
        }
        let mut record = self.proto.new_record();
        record.set_from(value)?;
        self.records.push(record);
        Ok(())
    }

    /// Visit records in order until the visitor returns `Ok(false)` or an
    /// error, which is handed back to the caller.
    pub fn for_each<E, F>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&Record) -> Result<bool, E>,
    {
        for record in &self.records {
            if !visitor(record)? {
                break;
            }
        }
        Ok(())
    }

    pub fn for_each_mut<E, F>(&mut self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&mut Record) -> Result<bool, E>,
    {
        for record in &mut self.records {
            if !visitor(record)? {
                break;
            }
        }
        Ok(())
    }
}

pub(crate) fn check_proto(proto: &Arc<Proto>, record: &Record) -> Result<(), RecordError> {
    if Arc::ptr_eq(proto, record.proto()) {
        return Ok(());
    }
    Err(RecordError::ForeignRecord {
        expected: proto.name().into(),
        actual: record.proto().name().into(),
    })
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Collection for List {
    fn proto(&self) -> &Arc<Proto> {
        &self.proto
    }

    fn proto_slot(&mut self) -> &mut Arc<Proto> {
        &mut self.proto
    }

    fn size(&self) -> usize {
        self.records.len()
    }

    fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    fn add_record(&mut self, record: Record) -> Result<(), RecordError> {
        self.append(record)
    }

    fn for_each<E, F>(&self, visitor: F) -> Result<(), E>
    where
        F: FnMut(&Record) -> Result<bool, E>,
    {
        List::for_each(self, visitor)
    }
}

impl Serialize for List {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in &self.records {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}
