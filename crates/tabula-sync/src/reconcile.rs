//! Change reconciliation: interaction events into visual state and domain patches
//!
//! Raw change records from the rendering surface are classified, sanitized,
//! and merged into the visual state; confirmed structural changes are
//! forwarded to the domain store. While a node's drag/resize flag is
//! active, no position update reaches the store and no overlap
//! recomputation runs; the terminal change (flag cleared) triggers exactly
//! one of each.

use crate::debounce::Tick;
use crate::node::{EdgeId, NodeId};
use crate::project;
use crate::select;
use crate::state::SyncState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tabula_core::geometry::{Point, Size};
use tabula_core::{AreaPatch, DiagramStore, TableId, TableStateUpdate};

/// A raw change record from the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceChange {
    /// A node moved, or a drag is in progress
    NodePosition {
        id: NodeId,
        position: Point,
        dragging: bool,
    },
    /// The surface reported node dimensions, or a resize is in progress
    NodeDimensions {
        id: NodeId,
        size: Size,
        resizing: bool,
    },
    /// The user removed a node
    NodeRemove { id: NodeId },
    /// Node selection toggled
    NodeSelect { id: NodeId, selected: bool },
    /// Edge selection toggled
    EdgeSelect { id: EdgeId, selected: bool },
    /// The user removed an edge
    EdgeRemove { id: EdgeId },
}

impl SurfaceChange {
    /// Whether this is a remove-type change (gated by read-only mode)
    pub fn is_remove(&self) -> bool {
        matches!(
            self,
            SurfaceChange::NodeRemove { .. } | SurfaceChange::EdgeRemove { .. }
        )
    }
}

/// Summary of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Batched table patches issued to the store (0 or 1 per pass)
    pub table_patches: usize,
    /// Individual area patches forwarded
    pub area_patches: usize,
    /// Removals forwarded to the store
    pub removals_forwarded: usize,
    /// Remove-type changes filtered out by read-only mode
    pub removals_filtered: usize,
    /// Stale changes referencing unknown ids
    pub stale_dropped: usize,
}

/// Apply a batch of surface changes
///
/// Table-state patches are merged per table and issued as one batched
/// store call; terminal position/dimension changes mark the table dirty
/// and arm the settle debounce so a drag burst yields at most one overlap
/// recomputation.
pub(crate) fn apply_surface_changes(
    state: &mut SyncState,
    store: &mut DiagramStore,
    changes: Vec<SurfaceChange>,
    read_only: bool,
    now: Tick,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();
    let mut batch: IndexMap<TableId, TableStateUpdate> = IndexMap::new();
    let mut removed_tables: Vec<TableId> = Vec::new();
    let mut removed_relationships = Vec::new();
    let mut removed_dependencies = Vec::new();
    let mut settled = false;

    for change in changes {
        if read_only && change.is_remove() {
            outcome.removals_filtered += 1;
            continue;
        }
        match change {
            SurfaceChange::NodePosition {
                id,
                position,
                dragging,
            } => {
                let Some(node) = state.nodes.get_mut(&id) else {
                    drop_stale(&mut outcome, id);
                    continue;
                };
                node.position = position.sanitized_or(node.position);
                node.dragging = dragging;
                if node.interaction_active() {
                    continue;
                }
                match id {
                    NodeId::Table(table_id) => {
                        batch
                            .entry(table_id)
                            .or_insert_with(|| blank_update(table_id))
                            .position = Some(node.position);
                        state.settle_dirty.insert(table_id);
                        settled = true;
                    }
                    NodeId::Area(area_id) => {
                        let patch = AreaPatch {
                            position: Some(node.position),
                            size: None,
                        };
                        if store.update_area(area_id, patch).is_ok() {
                            outcome.area_patches += 1;
                        } else {
                            drop_stale(&mut outcome, id);
                        }
                    }
                }
            }
            SurfaceChange::NodeDimensions { id, size, resizing } => {
                let Some(node) = state.nodes.get_mut(&id) else {
                    drop_stale(&mut outcome, id);
                    continue;
                };
                let size = size.sanitized_or(node.measured.unwrap_or_default());
                node.measured = Some(size);
                node.resizing = resizing;
                if node.interaction_active() {
                    continue;
                }
                match id {
                    NodeId::Table(table_id) => {
                        batch
                            .entry(table_id)
                            .or_insert_with(|| blank_update(table_id))
                            .width = Some(size.width);
                        state.settle_dirty.insert(table_id);
                        settled = true;
                    }
                    NodeId::Area(area_id) => {
                        let patch = AreaPatch {
                            position: None,
                            size: Some(size),
                        };
                        if store.update_area(area_id, patch).is_ok() {
                            outcome.area_patches += 1;
                        } else {
                            drop_stale(&mut outcome, id);
                        }
                    }
                }
            }
            SurfaceChange::NodeRemove { id } => {
                if state.nodes.shift_remove(&id).is_none() {
                    drop_stale(&mut outcome, id);
                    continue;
                }
                match id {
                    // vertex and edge cleanup arrives with the store's
                    // remove_tables event
                    NodeId::Table(table_id) => removed_tables.push(table_id),
                    NodeId::Area(area_id) => store.remove_area(area_id),
                }
                outcome.removals_forwarded += 1;
            }
            SurfaceChange::NodeSelect { id, selected } => {
                let Some(node) = state.nodes.get_mut(&id) else {
                    drop_stale(&mut outcome, id);
                    continue;
                };
                node.selected = selected;
            }
            SurfaceChange::EdgeSelect { id, selected } => {
                let Some(edge) = state.edges.get_mut(&id) else {
                    tracing::debug!(edge = %id, "dropping stale edge change");
                    outcome.stale_dropped += 1;
                    continue;
                };
                edge.selected = selected;
            }
            SurfaceChange::EdgeRemove { id } => {
                if state.edges.shift_remove(&id).is_none() {
                    tracing::debug!(edge = %id, "dropping stale edge change");
                    outcome.stale_dropped += 1;
                    continue;
                }
                match id {
                    EdgeId::Relationship(rel_id) => removed_relationships.push(rel_id),
                    EdgeId::Dependency(dep_id) => removed_dependencies.push(dep_id),
                }
                outcome.removals_forwarded += 1;
            }
        }
    }

    if !batch.is_empty() {
        store.update_tables_state(batch.into_values().collect());
        outcome.table_patches = 1;
    }
    if !removed_tables.is_empty() {
        store.remove_tables(&removed_tables);
    }
    if !removed_relationships.is_empty() {
        store.remove_relationships(&removed_relationships);
    }
    if !removed_dependencies.is_empty() {
        store.remove_dependencies(&removed_dependencies);
    }
    if !removed_relationships.is_empty() || !removed_dependencies.is_empty() {
        // surviving edges on the same target must close the index gap
        project::repack_handle_indices(&mut state.edges);
    }
    if settled {
        state.settle.arm(now);
    }

    select::sync_selection(state);
    outcome
}

fn blank_update(table_id: TableId) -> TableStateUpdate {
    TableStateUpdate {
        table_id,
        position: None,
        width: None,
    }
}

fn drop_stale(outcome: &mut ReconcileOutcome, id: NodeId) {
    tracing::debug!(node = %id, "dropping stale node change");
    outcome.stale_dropped += 1;
}
