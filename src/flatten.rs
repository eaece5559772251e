//! Breadth-first flattening of a scene-node forest.

use crate::scene::SceneNode;
use std::collections::VecDeque;
use std::sync::Arc;

/// Expand `roots` into every reachable node, breadth-first.
///
/// All nodes at depth d appear before any node at depth d + 1; within a
/// depth, children appear in parent-then-sibling order. Pure function;
/// scene hierarchies are acyclic by construction, so no cycle detection is
/// needed.
pub fn flatten(roots: &[Arc<SceneNode>]) -> Vec<Arc<SceneNode>> {
    let mut ordered = Vec::new();
    let mut frontier: VecDeque<Arc<SceneNode>> = roots.iter().cloned().collect();
    while let Some(node) = frontier.pop_front() {
        for child in node.children() {
            frontier.push_back(Arc::clone(child));
        }
        ordered.push(node);
    }
    ordered
}
