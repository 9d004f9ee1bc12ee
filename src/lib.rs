pub mod case;
pub mod collection;
pub mod config;
pub mod error;
pub mod factory;
pub mod proto;
pub mod record;
pub mod spooky_value;
pub mod types;

pub use case::Case;
pub use collection::{Collection, Compacted, CompositeKey, FieldKey, Key, KeyProvider, List, MultiMap, UniqueMap};
pub use config::ProtoConfig;
pub use error::RecordError;
pub use factory::Factory;
pub use proto::{Accessor, Field, FieldDescriptor, Mutator, Proto, ProtoBuilder};
pub use record::{OutputMap, Record};
pub use spooky_value::{FastMap, SpookyNumber, SpookyValue};
pub use types::FieldType;
