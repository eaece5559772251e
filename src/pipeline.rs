//! Per-node rebinding pipeline.
//!
//! Two independent sub-steps per node: solid-paint rebinding on the fill
//! and stroke slots, and relocation of explicit mode overrides onto the
//! target collection. The sub-steps touch disjoint node attributes and run
//! concurrently. Failures are reported and contained per node and per
//! entry; one node can never block another.

use crate::context::RunContext;
use crate::error::RelinkError;
use crate::scene::{PaintSlot, SceneNode};
use tracing::{debug, warn};

/// Process one node.
pub async fn process_node(ctx: &RunContext, node: &SceneNode) -> Result<(), RelinkError> {
    debug!(node = %node.id(), kind = ?node.kind(), "processing node");
    let (paints, ()) = tokio::join!(rebind_paints(ctx, node), reassign_modes(ctx, node));
    paints
}

/// Rebind bound solid paints on both paint slots.
async fn rebind_paints(ctx: &RunContext, node: &SceneNode) -> Result<(), RelinkError> {
    if !node.is_paintable() {
        return Ok(());
    }
    rebind_slot(ctx, node, PaintSlot::Fill).await?;
    rebind_slot(ctx, node, PaintSlot::Stroke).await?;
    Ok(())
}

async fn rebind_slot(
    ctx: &RunContext,
    node: &SceneNode,
    slot: PaintSlot,
) -> Result<(), RelinkError> {
    let Some(paints) = node.paints(slot) else {
        return Ok(());
    };

    let mut updated = paints.clone();
    let mut changed = false;
    for (index, paint) in paints.iter().enumerate() {
        let Some(bound) = paint.bound_variable() else {
            continue;
        };

        let resolved = match ctx.retry().run(|| ctx.host().variable_by_id(bound)).await {
            Ok(Some(variable)) => variable,
            Ok(None) => {
                debug!(node = %node.id(), variable = %bound, "bound variable not resolvable, leaving paint unchanged");
                continue;
            }
            Err(err) => {
                warn!(node = %node.id(), variable = %bound, error = %err, "variable resolution failed, leaving paint unchanged");
                continue;
            }
        };

        // Already migrated: re-running on this node stays a no-op.
        if let Some(target) = ctx.target_collection() {
            if resolved.collection_id == target.id {
                continue;
            }
        }

        let descriptor = match ctx.catalog().await?.find_by_name(&resolved.name) {
            Some(descriptor) => descriptor.clone(),
            None => {
                debug!(node = %node.id(), name = %resolved.name, "no catalog match, leaving paint unchanged");
                continue;
            }
        };

        let imported = match ctx.import_variable(&descriptor.key).await {
            Ok(variable) => variable,
            Err(err) => {
                warn!(node = %node.id(), key = %descriptor.key, error = %err, "variable import failed, leaving paint unchanged");
                continue;
            }
        };

        updated[index] = ctx.host().rebind_solid_paint(paint, &imported);
        changed = true;
    }

    // Replace the slot wholesale only when something actually changed.
    if changed {
        node.set_paints(slot, updated);
        debug!(node = %node.id(), slot = ?slot, "paint slot rebound");
    }
    Ok(())
}

/// Relocate explicit mode overrides onto the target collection.
///
/// Skipped for nodes nested inside a reusable-instance ancestor; their
/// overrides belong to the component.
async fn reassign_modes(ctx: &RunContext, node: &SceneNode) {
    if node.has_instance_ancestor() {
        return;
    }
    let Some(original) = node.explicit_modes() else {
        return;
    };
    if original.is_empty() {
        return;
    }

    for collection_id in original.keys() {
        let collection = match ctx
            .retry()
            .run(|| ctx.host().collection_by_id(collection_id))
            .await
        {
            Ok(Some(collection)) => collection,
            Ok(None) => {
                debug!(node = %node.id(), collection = %collection_id, "collection not resolvable, skipping entry");
                continue;
            }
            Err(err) => {
                warn!(node = %node.id(), collection = %collection_id, error = %err, "collection resolution failed, skipping entry");
                continue;
            }
        };
        ctx.host().clear_explicit_mode(node, &collection);
    }

    if let Some(target) = ctx.target_collection() {
        for mode in original.values() {
            ctx.host().set_explicit_mode(node, &target, mode);
        }
        debug!(node = %node.id(), modes = original.len(), "explicit modes relocated to target collection");
    }
}
