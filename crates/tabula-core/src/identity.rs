//! Identifier newtypes for domain entities

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new id
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw id value
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a table
    TableId,
    "table"
);

define_id!(
    /// Unique identifier for a field within a diagram
    FieldId,
    "field"
);

define_id!(
    /// Unique identifier for a freeform area
    AreaId,
    "area"
);

define_id!(
    /// Unique identifier for a relationship
    RelationshipId,
    "relationship"
);

define_id!(
    /// Unique identifier for a table dependency
    DependencyId,
    "dependency"
);
