use super::Collection;
use super::key::{Key, KeyProvider};
use super::list::{List, check_proto};
use crate::error::RecordError;
use crate::proto::Proto;
use crate::record::Record;
use crate::spooky_value::SpookyValue;
use crate::types::FxMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;

// ─── MultiMap ───────────────────────────────────────────────────────────────

/// Records grouped by key. Each bucket is a [`List`] kept in insertion
/// order; buckets iterate in the order their key first appeared.
pub struct MultiMap {
    proto: Arc<Proto>,
    index: FxMap<Key, usize>,
    buckets: Vec<(Key, List)>,
    key_provider: Box<dyn KeyProvider>,
}

impl fmt::Debug for MultiMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiMap")
            .field("proto", &self.proto.name())
            .field("buckets", &self.buckets)
            .finish()
    }
}

impl MultiMap {
    pub fn new(proto: Arc<Proto>, key_provider: impl KeyProvider + 'static) -> Self {
        Self {
            proto,
            index: FxMap::default(),
            buckets: Vec::new(),
            key_provider: Box::new(key_provider),
        }
    }

    #[inline]
    pub fn proto(&self) -> &Arc<Proto> {
        &self.proto
    }

    /// Number of distinct keys.
    #[inline]
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of records across all buckets.
    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(|(_, list)| list.size()).sum()
    }

    /// Append `record` to the bucket of its derived key.
    pub fn add(&mut self, record: Record) -> Result<(), RecordError> {
        check_proto(&self.proto, &record)?;
        let key = self.key_provider.key(&record);
        let bucket = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.buckets.len();
                self.index.insert(key.clone(), i);
                self.buckets.push((key, List::new(self.proto.clone())));
                i
            }
        };
        self.buckets[bucket].1.append(record)
    }

    /// Build a record from a map and add it.
    pub fn add_value(&mut self, value: &SpookyValue) -> Result<(), RecordError> {
        let mut record = self.proto.new_record();
        record.set_from(value)?;
        self.add(record)
    }

    /// The bucket of `key`, if any record has it.
    pub fn slice(&self, key: impl Into<Key>) -> Option<&List> {
        let key = key.into();
        self.index.get(&key).map(|&i| &self.buckets[i].1)
    }

    /// Mutable bucket; changes are visible through the map.
    pub fn slice_mut(&mut self, key: impl Into<Key>) -> Option<&mut List> {
        let key = key.into();
        self.index.get(&key).map(|&i| &mut self.buckets[i].1)
    }

    pub fn first(&self) -> Option<&Record> {
        self.buckets.iter().find_map(|(_, list)| list.first())
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.buckets.iter().map(|(key, _)| key)
    }

    /// Visit buckets until the visitor returns `Ok(false)` or an error.
    pub fn for_each_bucket<E, F>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&Key, &List) -> Result<bool, E>,
    {
        for (key, list) in &self.buckets {
            if !visitor(key, list)? {
                break;
            }
        }
        Ok(())
    }

    /// Like [`Self::for_each_bucket`], with write access to each bucket.
    pub fn for_each_bucket_mut<E, F>(&mut self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&Key, &mut List) -> Result<bool, E>,
    {
        for (key, list) in &mut self.buckets {
            if !visitor(key, list)? {
                break;
            }
        }
        Ok(())
    }

    /// Visit every record, bucket by bucket.
    pub fn for_each<E, F>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&Record) -> Result<bool, E>,
    {
        for (_, list) in &self.buckets {
            for record in list {
                if !visitor(record)? {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

impl Collection for MultiMap {
    fn proto(&self) -> &Arc<Proto> {
        &self.proto
    }

    fn proto_slot(&mut self) -> &mut Arc<Proto> {
        &mut self.proto
    }

    fn size(&self) -> usize {
        self.buckets.len()
    }

    fn first(&self) -> Option<&Record> {
        MultiMap::first(self)
    }

    fn add_record(&mut self, record: Record) -> Result<(), RecordError> {
        self.add(record)
    }

    fn for_each<E, F>(&self, visitor: F) -> Result<(), E>
    where
        F: FnMut(&Record) -> Result<bool, E>,
    {
        MultiMap::for_each(self, visitor)
    }
}

/// Serializes as a map of stringified key → bucket.
impl Serialize for MultiMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (key, list) in &self.buckets {
            map.serialize_entry(&key_label(key), list)?;
        }
        map.end()
    }
}

fn key_label(key: &Key) -> String {
    match key {
        Key::Null => "null".to_string(),
        Key::Bool(b) => b.to_string(),
        Key::Int(i) => i.to_string(),
        Key::UInt(u) => u.to_string(),
        Key::Float(bits) => f64::from_bits(*bits).to_string(),
        Key::Str(s) => s.to_string(),
        Key::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        Key::Time(t) => t.to_rfc3339(),
        Key::Composite(parts) => parts.iter().map(key_label).collect::<Vec<_>>().join("/"),
    }
}
