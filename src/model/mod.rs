//! Entity records of the Employee domain and the traits shared by all of them.

/// Identity equality: equal iff both keys are assigned and equal; a record
/// without a key equals only itself. The hash covers the entity name alone so
/// it stays stable when the key is assigned after insertion into a set.
macro_rules! identity_eq {
    ($ty:ty, $key:ident) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                match (&self.$key, &other.$key) {
                    (Some(a), Some(b)) => a == b,
                    _ => std::ptr::eq(self, other),
                }
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(<$ty as $crate::model::Entity>::ENTITY_NAME, state);
            }
        }
    };
}

pub(crate) use identity_eq;

pub mod relation;
pub mod table;

mod country;
mod department;
mod employee;
mod job;
mod job_history;
mod location;
mod region;

pub use country::Country;
pub use department::Department;
pub use employee::Employee;
pub use job::Job;
pub use job_history::JobHistory;
pub use location::Location;
pub use region::Region;
pub use table::{Collection, Column, Reference, SqlType, TableDef};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

/// First value handed out by the shared id sequence.
pub const SEQUENCE_START: i64 = 1050;

/// How a new identifier is produced when a record is inserted without one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyStrategy {
    /// 64-bit integer taken from the shared sequence.
    Sequence,
    /// Text key rendered from the shared sequence.
    SequenceText,
}

/// Identifier types that can be minted from the shared sequence.
pub trait SequenceKey: Sized {
    const STRATEGY: KeyStrategy;

    fn from_sequence(value: i64) -> Self;
}

impl SequenceKey for i64 {
    const STRATEGY: KeyStrategy = KeyStrategy::Sequence;

    fn from_sequence(value: i64) -> Self {
        value
    }
}

impl SequenceKey for String {
    const STRATEGY: KeyStrategy = KeyStrategy::SequenceText;

    fn from_sequence(value: i64) -> Self {
        value.to_string()
    }
}

/// A persisted record type exposed as a REST resource.
///
/// Equality of implementors is identity-based (see `identity_eq!`), so two
/// records compare equal only when both carry the same assigned key.
pub trait Entity:
    Clone + Debug + Eq + Hash + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Id: Clone
        + Debug
        + Display
        + FromStr
        + Ord
        + Hash
        + SequenceKey
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Name used in alert and error headers, e.g. `employeeJob`.
    const ENTITY_NAME: &'static str;
    /// Collection segment under `/api`.
    const PATH: &'static str;
    const KEY_STRATEGY: KeyStrategy = <Self::Id as SequenceKey>::STRATEGY;

    fn id(&self) -> Option<&Self::Id>;

    fn set_id(&mut self, id: Self::Id);

    /// Merge-patch: every present field of `patch` overwrites the field on `self`.
    /// Child collections are not merged.
    fn merge(&mut self, patch: Self);

    /// Copy holding only the key and scalar fields. Used when the record is
    /// rendered nested under another record.
    fn detached(&self) -> Self;

    /// Points every loaded child back at this record.
    fn link_children(&mut self) {}

    fn table() -> &'static TableDef;
}

/// Overwrites `target` when `value` is present.
pub(crate) fn merge_field<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}
