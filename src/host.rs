//! Host capability contract for variable operations.
//!
//! The concrete remote API is a collaborator injected by the embedding
//! host; the engine only depends on these call semantics. Every async call
//! may fail with the transient rate-limit signal (retried) or any other
//! error (propagated or logged, never retried).

use crate::error::RelinkError;
use crate::scene::{Paint, SceneNode};
use crate::types::{
    CollectionId, LibraryKey, LibraryRef, MaterializedVariable, ModeId, SourceVariableDescriptor,
    VariableCollection, VariableId, VariableKey,
};
use async_trait::async_trait;

/// Remote variable operations exposed by the embedding host.
///
/// The async methods are the run's suspension points. The sync methods are
/// a pure paint transform and two host-side node mutations; none of them
/// touch the network.
#[async_trait]
pub trait VariableHost: Send + Sync {
    /// Whether the host exposes the library catalog surface at all.
    fn has_library_catalog(&self) -> bool;

    /// Enumerate the libraries available to the working context.
    async fn list_libraries(&self) -> Result<Vec<LibraryRef>, RelinkError>;

    /// Fetch the variable descriptors published by a library.
    async fn library_variables(
        &self,
        library: &LibraryKey,
    ) -> Result<Vec<SourceVariableDescriptor>, RelinkError>;

    /// Import a source variable into the working context.
    async fn import_variable(&self, key: &VariableKey)
        -> Result<MaterializedVariable, RelinkError>;

    /// Resolve a materialized variable by id.
    async fn variable_by_id(
        &self,
        id: &VariableId,
    ) -> Result<Option<MaterializedVariable>, RelinkError>;

    /// Resolve a variable collection by id.
    async fn collection_by_id(
        &self,
        id: &CollectionId,
    ) -> Result<Option<VariableCollection>, RelinkError>;

    /// Pure transform: `paint` with its color channel bound to `variable`.
    /// Non-solid paints pass through unchanged.
    fn rebind_solid_paint(&self, paint: &Paint, variable: &MaterializedVariable) -> Paint {
        match paint {
            Paint::Solid { color, .. } => Paint::Solid {
                color: *color,
                bound_variable: Some(variable.id.clone()),
            },
            other => other.clone(),
        }
    }

    /// Clear the node's explicit mode for `collection`.
    fn clear_explicit_mode(&self, node: &SceneNode, collection: &VariableCollection);

    /// Set the node's explicit mode for `collection`.
    fn set_explicit_mode(&self, node: &SceneNode, collection: &VariableCollection, mode: &ModeId);
}
