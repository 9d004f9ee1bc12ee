use super::Collection;
use super::key::{Key, KeyProvider};
use super::list::check_proto;
use crate::error::RecordError;
use crate::proto::Proto;
use crate::record::Record;
use crate::spooky_value::SpookyValue;
use crate::types::FxMap;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;
use std::sync::Arc;

// ─── UniqueMap ──────────────────────────────────────────────────────────────

/// One record per key. A later record with the same key replaces the
/// earlier one in place, so iteration follows first insertion of each key.
pub struct UniqueMap {
    proto: Arc<Proto>,
    index: FxMap<Key, usize>,
    entries: Vec<(Key, Record)>,
    key_provider: Box<dyn KeyProvider>,
}

impl fmt::Debug for UniqueMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueMap")
            .field("proto", &self.proto.name())
            .field("entries", &self.entries)
            .finish()
    }
}

impl UniqueMap {
    pub fn new(proto: Arc<Proto>, key_provider: impl KeyProvider + 'static) -> Self {
        Self {
            proto,
            index: FxMap::default(),
            entries: Vec::new(),
            key_provider: Box::new(key_provider),
        }
    }

    #[inline]
    pub fn proto(&self) -> &Arc<Proto> {
        &self.proto
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store `record` under an explicit key, replacing any previous one.
    pub fn put(&mut self, key: impl Into<Key>, record: Record) -> Result<(), RecordError> {
        check_proto(&self.proto, &record)?;
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = record,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, record));
            }
        }
        Ok(())
    }

    /// Store `record` under the key its provider derives.
    pub fn add(&mut self, record: Record) -> Result<(), RecordError> {
        let key = self.key_provider.key(&record);
        self.put(key, record)
    }

    /// Build a record from a map and add it.
    pub fn add_value(&mut self, value: &SpookyValue) -> Result<(), RecordError> {
        let mut record = self.proto.new_record();
        record.set_from(value)?;
        self.add(record)
    }

    pub fn get(&self, key: impl Into<Key>) -> Option<&Record> {
        let key = key.into();
        self.index.get(&key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut Record> {
        let key = key.into();
        self.index.get(&key).map(|&i| &mut self.entries[i].1)
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.index.contains_key(&key.into())
    }

    pub fn first(&self) -> Option<&Record> {
        self.entries.first().map(|(_, record)| record)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Record)> {
        self.entries.iter().map(|(key, record)| (key, record))
    }

    /// Visit key/record pairs until the visitor returns `Ok(false)` or an
    /// error.
    pub fn for_each_pair<E, F>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&Key, &Record) -> Result<bool, E>,
    {
        for (key, record) in &self.entries {
            if !visitor(key, record)? {
                break;
            }
        }
        Ok(())
    }

    pub fn for_each<E, F>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&Record) -> Result<bool, E>,
    {
        self.for_each_pair(|_, record| visitor(record))
    }
}

impl Collection for UniqueMap {
    fn proto(&self) -> &Arc<Proto> {
        &self.proto
    }

    fn proto_slot(&mut self) -> &mut Arc<Proto> {
        &mut self.proto
    }

    fn size(&self) -> usize {
        self.entries.len()
    }

    fn first(&self) -> Option<&Record> {
        UniqueMap::first(self)
    }

    fn add_record(&mut self, record: Record) -> Result<(), RecordError> {
        self.add(record)
    }

    fn for_each<E, F>(&self, visitor: F) -> Result<(), E>
    where
        F: FnMut(&Record) -> Result<bool, E>,
    {
        UniqueMap::for_each(self, visitor)
    }
}

/// Serializes as the sequence of records, like a [`super::List`].
impl Serialize for UniqueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (_, record) in &self.entries {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}
