//! Domain event consumer
//!
//! Applies drained domain events to the visual state, in emission order.
//! Projection here is incremental: each event touches only the nodes and
//! edges it names, with `LoadDiagram` as the single full-rebuild path.

use crate::debounce::Tick;
use crate::node::{NodeId, NodePayload};
use crate::project;
use crate::select;
use crate::state::SyncState;
use indexmap::IndexMap;
use tabula_core::geometry::Size;
use tabula_core::{
    rendered_table_height, DatabaseKind, DomainEvent, SchemaFilter, TableId, TablePatch,
    MIN_TABLE_WIDTH,
};

/// Store-derived context the consumer projects against
#[derive(Debug, Clone, Copy)]
pub struct ConsumeCtx<'a> {
    pub filter: &'a SchemaFilter,
    pub show_dependencies: bool,
    pub database: DatabaseKind,
}

/// Apply one domain event to the visual state
pub(crate) fn apply_event(state: &mut SyncState, ctx: ConsumeCtx<'_>, event: DomainEvent, now: Tick) {
    tracing::debug!(event = event.kind_name(), "applying domain event");
    match event {
        DomainEvent::AddTables { tables } => {
            let mut settled = Vec::new();
            for table in &tables {
                let mut node = project::table_to_node(table, ctx.filter);
                if let Some(prior) = state.nodes.get(&node.id) {
                    node = node.carry_interaction(prior);
                }
                if !node.interaction_active() {
                    settled.push(table.id);
                }
                state.nodes.insert(node.id, node);
            }
            state.overlap.update_nodes(settled, &state.nodes);
            state.refresh_overlap_flags();
        }
        DomainEvent::RemoveTables { table_ids } => {
            for id in &table_ids {
                state.nodes.shift_remove(&NodeId::Table(*id));
                state.overlap.remove_vertex(*id);
                state.settle_dirty.shift_remove(id);
                state.pulsed.shift_remove(id);
            }
            state
                .edges
                .retain(|_, edge| {
                    !table_ids.contains(&edge.source_table_id)
                        && !table_ids.contains(&edge.target_table_id)
                });
            project::repack_handle_indices(&mut state.edges);
            state.refresh_overlap_flags();
            select::sync_selection(state);
        }
        DomainEvent::AddField { table_id, field } => {
            let active = patch_table_node(state, table_id, |table| {
                if table.field(field.id).is_none() {
                    table.fields.push(field);
                }
            });
            finish_table_change(state, table_id, active);
        }
        DomainEvent::RemoveField { table_id, field_id } => {
            let active = patch_table_node(state, table_id, |table| {
                table.fields.retain(|f| f.id != field_id);
            });
            finish_table_change(state, table_id, active);
        }
        DomainEvent::UpdateTable { table_id, patch } => {
            let active = apply_table_patch(state, table_id, patch);
            finish_table_change(state, table_id, active);
        }
        DomainEvent::LoadDiagram { diagram } => {
            let mut nodes = IndexMap::new();
            for area in &diagram.areas {
                let mut node = project::area_to_node(area);
                if let Some(prior) = state.nodes.get(&node.id) {
                    node = node.carry_interaction(prior);
                }
                nodes.insert(node.id, node);
            }
            for table in &diagram.tables {
                let mut node = project::table_to_node(table, ctx.filter);
                if let Some(prior) = state.nodes.get(&node.id) {
                    node = node.carry_interaction(prior);
                }
                nodes.insert(node.id, node);
            }

            let mut edges = IndexMap::new();
            let relationship_edges = project::relationships_to_edges(&diagram.relationships);
            let dependency_edges = project::dependencies_to_edges(
                &diagram.dependencies,
                ctx.show_dependencies,
                ctx.database,
            );
            for mut edge in relationship_edges.into_iter().chain(dependency_edges) {
                if let Some(prior) = state.edges.get(&edge.id) {
                    edge = edge.carry_selection(prior);
                }
                edges.insert(edge.id, edge);
            }

            state.nodes = nodes;
            state.edges = edges;
            // the rebuild supersedes any pending incremental settle or pulse
            state.settle.cancel();
            state.settle_dirty.clear();
            state.pulse.cancel();
            let pulsed: Vec<TableId> = state.pulsed.drain(..).collect();
            for id in pulsed {
                if let Some(node) = state.nodes.get_mut(&NodeId::Table(id)) {
                    node.highlighted = false;
                }
            }
            state.overlap.recompute_all(state.nodes.values());
            state.refresh_overlap_flags();
            select::sync_selection(state);
            state.fit.arm(now);
        }
    }
}

/// Mutate a table node's payload and re-derive its measured height
///
/// The rendered height follows the field count; the width keeps the
/// surface-reported value, falling back to the payload width for nodes the
/// surface has not measured yet. Returns whether an interaction owns the
/// node (callers defer the overlap update in that case), or None when the
/// node is unknown.
fn patch_table_node<F>(state: &mut SyncState, table_id: TableId, mutate: F) -> Option<bool>
where
    F: FnOnce(&mut tabula_core::Table),
{
    let node = state.nodes.get_mut(&NodeId::Table(table_id))?;
    let NodePayload::Table(table) = &mut node.payload else {
        return None;
    };
    mutate(table);
    let field_count = table.fields.len();
    let width = node
        .measured
        .map(|m| m.width)
        .or(table.width)
        .unwrap_or(MIN_TABLE_WIDTH);
    node.measured = Some(Size::new(width, rendered_table_height(field_count)));
    Some(node.interaction_active())
}

/// Apply an applied-patch event to the node payload and visual fields
fn apply_table_patch(state: &mut SyncState, table_id: TableId, patch: TablePatch) -> Option<bool> {
    let node = state.nodes.get_mut(&NodeId::Table(table_id))?;
    let active = node.interaction_active();
    let NodePayload::Table(table) = &mut node.payload else {
        return None;
    };
    if let Some(name) = patch.name {
        table.name = name;
    }
    if let Some(width) = patch.width {
        table.width = Some(width);
        if !active {
            if let Some(measured) = &mut node.measured {
                measured.width = width;
            }
        }
    }
    if let Some(position) = patch.position {
        table.position = position;
        if !active {
            node.position = position;
        }
    }
    Some(active)
}

fn finish_table_change(state: &mut SyncState, table_id: TableId, active: Option<bool>) {
    match active {
        Some(false) => {
            state.overlap.update_node(table_id, &state.nodes);
            state.refresh_overlap_flags();
        }
        // the terminal interaction change will settle the overlap later
        Some(true) => {
            state.settle_dirty.insert(table_id);
        }
        None => {
            tracing::debug!(table = %table_id, "dropping event for unknown node");
        }
    }
}
