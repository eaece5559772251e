//! In-memory scene graph: design nodes with explicit capability facets.
//!
//! A node combines any subset of three orthogonal capabilities: it always
//! exposes an ordered child list (leaves hold an empty one), it may expose
//! fill and/or stroke paint slots, and it may expose an explicit
//! collection-to-mode override map. Capabilities are typed `Option`s and are
//! checked explicitly, never probed structurally.

use crate::types::{CollectionId, ModeId, NodeId, VariableId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

/// Node kind; `Instance` marks reusable-component instances, which shield
/// their subtree from mode reassignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Frame,
    Group,
    Instance,
    Shape,
    Text,
}

/// RGBA color, channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Paint descriptor; only `Solid` can carry a bound color variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Solid {
        color: Color,
        bound_variable: Option<VariableId>,
    },
    Gradient {
        stops: Vec<(f32, Color)>,
    },
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Paint::Solid {
            color,
            bound_variable: None,
        }
    }

    pub fn solid_bound(color: Color, variable: VariableId) -> Self {
        Paint::Solid {
            color,
            bound_variable: Some(variable),
        }
    }

    /// The bound color variable, if this is a bound solid paint.
    pub fn bound_variable(&self) -> Option<&VariableId> {
        match self {
            Paint::Solid { bound_variable, .. } => bound_variable.as_ref(),
            _ => None,
        }
    }
}

/// Which paint slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintSlot {
    Fill,
    Stroke,
}

/// A node in the design hierarchy.
///
/// The tree shape is fixed after construction; only paint slots and the
/// explicit mode map are mutated during a run, and only by the task
/// processing this node.
pub struct SceneNode {
    id: NodeId,
    kind: NodeKind,
    children: Vec<Arc<SceneNode>>,
    parent: RwLock<Weak<SceneNode>>,
    fills: Option<RwLock<Vec<Paint>>>,
    strokes: Option<RwLock<Vec<Paint>>>,
    explicit_modes: Option<RwLock<BTreeMap<CollectionId, ModeId>>>,
}

impl SceneNode {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[Arc<SceneNode>] {
        &self.children
    }

    pub fn parent(&self) -> Option<Arc<SceneNode>> {
        self.parent.read().upgrade()
    }

    pub fn is_paintable(&self) -> bool {
        self.fills.is_some() || self.strokes.is_some()
    }

    pub fn is_mode_host(&self) -> bool {
        self.explicit_modes.is_some()
    }

    /// Snapshot of a paint slot, if the node exposes it.
    pub fn paints(&self, slot: PaintSlot) -> Option<Vec<Paint>> {
        self.slot(slot).map(|lock| lock.read().clone())
    }

    /// Replace a paint slot wholesale.
    pub fn set_paints(&self, slot: PaintSlot, paints: Vec<Paint>) {
        if let Some(lock) = self.slot(slot) {
            *lock.write() = paints;
        }
    }

    fn slot(&self, slot: PaintSlot) -> Option<&RwLock<Vec<Paint>>> {
        match slot {
            PaintSlot::Fill => self.fills.as_ref(),
            PaintSlot::Stroke => self.strokes.as_ref(),
        }
    }

    /// Snapshot of the explicit collection-to-mode map, if the node is a
    /// mode host.
    pub fn explicit_modes(&self) -> Option<BTreeMap<CollectionId, ModeId>> {
        self.explicit_modes.as_ref().map(|lock| lock.read().clone())
    }

    pub fn clear_explicit_mode(&self, collection: &CollectionId) {
        if let Some(lock) = &self.explicit_modes {
            lock.write().remove(collection);
        }
    }

    pub fn set_explicit_mode(&self, collection: CollectionId, mode: ModeId) {
        if let Some(lock) = &self.explicit_modes {
            lock.write().insert(collection, mode);
        }
    }

    /// Walks the ancestor chain looking for a reusable-instance node.
    pub fn has_instance_ancestor(&self) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.kind == NodeKind::Instance {
                return true;
            }
            current = node.parent();
        }
        false
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneNode")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("children", &self.children.len())
            .finish()
    }
}

/// Builder for scene subtrees; links child-to-parent pointers on `build`.
pub struct NodeBuilder {
    id: NodeId,
    kind: NodeKind,
    children: Vec<NodeBuilder>,
    fills: Option<Vec<Paint>>,
    strokes: Option<Vec<Paint>>,
    explicit_modes: Option<BTreeMap<CollectionId, ModeId>>,
}

impl NodeBuilder {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            children: Vec::new(),
            fills: None,
            strokes: None,
            explicit_modes: None,
        }
    }

    pub fn child(mut self, child: NodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn fills(mut self, paints: Vec<Paint>) -> Self {
        self.fills = Some(paints);
        self
    }

    pub fn strokes(mut self, paints: Vec<Paint>) -> Self {
        self.strokes = Some(paints);
        self
    }

    /// Expose the mode-host capability with an empty override map.
    pub fn mode_host(mut self) -> Self {
        self.explicit_modes.get_or_insert_with(BTreeMap::new);
        self
    }

    pub fn explicit_mode(mut self, collection: impl Into<CollectionId>, mode: impl Into<ModeId>) -> Self {
        self.explicit_modes
            .get_or_insert_with(BTreeMap::new)
            .insert(collection.into(), mode.into());
        self
    }

    pub fn build(self) -> Arc<SceneNode> {
        let children: Vec<Arc<SceneNode>> =
            self.children.into_iter().map(NodeBuilder::build).collect();
        let node = Arc::new(SceneNode {
            id: self.id,
            kind: self.kind,
            children,
            parent: RwLock::new(Weak::new()),
            fills: self.fills.map(RwLock::new),
            strokes: self.strokes.map(RwLock::new),
            explicit_modes: self.explicit_modes.map(RwLock::new),
        });
        for child in &node.children {
            *child.parent.write() = Arc::downgrade(&node);
        }
        node
    }
}
