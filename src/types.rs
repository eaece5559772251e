//! Core identifiers and remote-entity types shared across the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Stable identifier of a scene node.
    NodeId
);

string_id!(
    /// Identifier of a variable materialized in the working context.
    VariableId
);

string_id!(
    /// Stable key of a source-library variable; survives across documents.
    VariableKey
);

string_id!(
    /// Stable key of a remotely catalogued library.
    LibraryKey
);

string_id!(
    /// Identifier of a variable collection.
    CollectionId
);

string_id!(
    /// Identifier of a named mode within a collection.
    ModeId
);

/// A remotely catalogued library that can provide variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryRef {
    pub name: String,
    pub key: LibraryKey,
}

/// A named binding target from the source-library catalog.
///
/// Immutable once fetched. Catalog matching is by `name`; the `key` is what
/// gets imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceVariableDescriptor {
    pub key: VariableKey,
    pub name: String,
}

/// A source descriptor materialized into the working context.
///
/// Owned by the run; never mutated after import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedVariable {
    pub id: VariableId,
    pub name: String,
    pub collection_id: CollectionId,
}

/// A group of variables defining selectable modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableCollection {
    pub id: CollectionId,
    pub name: String,
}
