pub mod compacted;
pub mod key;
pub mod list;
pub mod multimap;
pub mod unique_map;

pub use compacted::Compacted;
pub use key::{CompositeKey, FieldKey, Key, KeyProvider};
pub use list::List;
pub use multimap::MultiMap;
pub use unique_map::UniqueMap;

use crate::error::RecordError;
use crate::proto::Proto;
use crate::record::Record;
use std::sync::Arc;

/// What every record container offers; [`Compacted::update`] rehydrates
/// into any of them.
pub trait Collection {
    fn proto(&self) -> &Arc<Proto>;

    /// The proto handle itself, swapped or extended when new fields are
    /// merged in.
    fn proto_slot(&mut self) -> &mut Arc<Proto>;

    fn size(&self) -> usize;

    fn first(&self) -> Option<&Record>;

    fn add_record(&mut self, record: Record) -> Result<(), RecordError>;

    /// Visit records until the visitor returns `Ok(false)` or an error.
    fn for_each<E, F>(&self, visitor: F) -> Result<(), E>
    where
        F: FnMut(&Record) -> Result<bool, E>;
}
