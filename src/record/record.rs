use super::set_mask::SetMask;
use crate::proto::Proto;
use crate::spooky_value::SpookyValue;
use std::fmt;
use std::sync::Arc;

// ─── Record ─────────────────────────────────────────────────────────────────

/// One instance of a [`Proto`].
///
/// Values live in a single positional vector sized at creation. A slot is
/// meaningful only while its set bit is on: an unset field reads as absent,
/// never as its type's zero value.
#[derive(Clone)]
pub struct Record {
    pub(crate) proto: Arc<Proto>,
    pub(crate) values: Vec<SpookyValue>,
    pub(crate) set_mask: SetMask,
}

impl Record {
    pub(crate) fn new(proto: Arc<Proto>) -> Self {
        let values = proto.zero_values().to_vec();
        let set_mask = SetMask::new(values.len());
        Self {
            proto,
            values,
            set_mask,
        }
    }

    #[inline]
    pub fn proto(&self) -> &Arc<Proto> {
        &self.proto
    }

    /// Field count of the proto.
    #[inline]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_set(&self, position: usize) -> bool {
        self.set_mask.get(position)
    }

    /// True when no field has been set.
    #[inline]
    pub fn is_nil(&self) -> bool {
        self.set_mask.is_empty()
    }

    /// Number of fields set.
    pub fn set_count(&self) -> usize {
        self.set_mask.count()
    }

    /// Write an already coerced value and mark the slot set.
    #[inline]
    pub(crate) fn store(&mut self, position: usize, value: SpookyValue) {
        self.values[position] = value;
        self.set_mask.set(position);
    }
}

impl PartialEq for Record {
    /// Same proto and the same set fields holding equal values.
    fn eq(&self, other: &Self) -> bool {
        if self.proto.id() != other.proto.id() || self.set_mask != other.set_mask {
            return false;
        }
        (0..self.values.len())
            .filter(|&i| self.set_mask.get(i))
            .all(|i| self.values[i] == other.values[i])
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (i, field) in self.proto.fields().iter().enumerate() {
            if self.set_mask.get(i) {
                map.entry(&field.name(), &self.values[i]);
            }
        }
        map.finish()?;
        write!(f, " @{}", self.proto.name())
    }
}
