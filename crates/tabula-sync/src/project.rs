//! Pure projection from domain entities to visual records
//!
//! No side effects and no error conditions: malformed numerics are
//! sanitized, never rejected.

use crate::node::{
    EdgeId, EdgeKind, EdgePayload, NodeId, NodeKind, NodePayload, VisualEdge, VisualNode,
    AREA_LAYER, EDGE_LAYER, TABLE_LAYER,
};
use indexmap::IndexMap;
use tabula_core::geometry::{sanitize, Size};
use tabula_core::{
    Area, DatabaseKind, Dependency, FieldId, Relationship, SchemaFilter, Table, TableId,
    MIN_TABLE_WIDTH,
};

/// Handle id prefix on the source side of a relationship edge
pub const SOURCE_HANDLE_ID_PREFIX: &str = "source_";

/// Handle id prefix on the target side of a relationship edge
pub const TARGET_HANDLE_ID_PREFIX: &str = "target_";

/// Handle id prefix on the source side of a dependency edge
pub const DEPENDENCY_SOURCE_HANDLE_ID_PREFIX: &str = "dep_source_";

/// Handle id prefix on the target side of a dependency edge
pub const DEPENDENCY_TARGET_HANDLE_ID_PREFIX: &str = "dep_target_";

/// Project a table into a visual node
///
/// Non-finite coordinates are sanitized to 0, the width defaults to
/// [`MIN_TABLE_WIDTH`] when absent, and `hidden` follows the schema
/// filter. The node starts unmeasured; dimensions become authoritative
/// once the rendering surface reports them.
pub fn table_to_node(table: &Table, filter: &SchemaFilter) -> VisualNode {
    let hidden = !filter.shows(table.schema.as_deref());
    let mut table = table.clone();
    table.position = table.position.sanitized();
    table.width = Some(sanitize(
        table.width.unwrap_or(MIN_TABLE_WIDTH),
        MIN_TABLE_WIDTH,
    ));
    VisualNode {
        id: NodeId::Table(table.id),
        kind: NodeKind::Table,
        position: table.position,
        measured: None,
        payload: NodePayload::Table(table),
        overlapping: false,
        highlighted: false,
        dragging: false,
        resizing: false,
        selected: false,
        hidden,
        z_index: TABLE_LAYER,
    }
}

/// Project an area into a visual node on the fixed background layer
///
/// The domain size is carried as the measured size, since areas have
/// explicit dimensions rather than content-derived ones.
pub fn area_to_node(area: &Area) -> VisualNode {
    let mut area = area.clone();
    area.position = area.position.sanitized();
    area.size = area.size.sanitized_or(Size::default());
    VisualNode {
        id: NodeId::Area(area.id),
        kind: NodeKind::Area,
        position: area.position,
        measured: Some(area.size),
        payload: NodePayload::Area(area),
        overlapping: false,
        highlighted: false,
        dragging: false,
        resizing: false,
        selected: false,
        hidden: false,
        z_index: AREA_LAYER,
    }
}

/// Project relationships into edges
///
/// Relationships landing on the same (target table, target field) share a
/// connection point; each gets a densely packed handle index starting at 0,
/// in input order, baked into the target handle id.
pub fn relationships_to_edges(relationships: &[Relationship]) -> Vec<VisualEdge> {
    let mut indices: IndexMap<(TableId, FieldId), u32> = IndexMap::new();
    relationships
        .iter()
        .map(|rel| {
            let slot = indices
                .entry((rel.target_table_id, rel.target_field_id))
                .or_insert(0);
            let index = *slot;
            *slot += 1;
            VisualEdge {
                id: EdgeId::Relationship(rel.id),
                kind: EdgeKind::Relationship,
                source_table_id: rel.source_table_id,
                target_table_id: rel.target_table_id,
                source_handle: format!(
                    "{SOURCE_HANDLE_ID_PREFIX}{}",
                    rel.source_field_id.raw()
                ),
                target_handle: format!(
                    "{TARGET_HANDLE_ID_PREFIX}{index}_{}",
                    rel.target_field_id.raw()
                ),
                payload: EdgePayload::Relationship(rel.clone()),
                selected: false,
                highlighted: false,
                animated: false,
                hidden: false,
                z_index: EDGE_LAYER,
            }
        })
        .collect()
}

/// Project dependencies into edges
///
/// Same dense handle indexing as relationships, keyed by the depended-on
/// table id. Dependency edges are hidden unless the show-dependencies
/// preference is set or the active dialect mandates visibility.
pub fn dependencies_to_edges(
    dependencies: &[Dependency],
    show_dependencies: bool,
    database: DatabaseKind,
) -> Vec<VisualEdge> {
    let hidden = !(show_dependencies || database.always_shows_dependencies());
    let mut indices: IndexMap<TableId, u32> = IndexMap::new();
    dependencies
        .iter()
        .map(|dep| {
            let slot = indices.entry(dep.table_id).or_insert(0);
            let index = *slot;
            *slot += 1;
            VisualEdge {
                id: EdgeId::Dependency(dep.id),
                kind: EdgeKind::Dependency,
                source_table_id: dep.dependent_table_id,
                target_table_id: dep.table_id,
                source_handle: format!(
                    "{DEPENDENCY_SOURCE_HANDLE_ID_PREFIX}{}",
                    dep.dependent_table_id.raw()
                ),
                target_handle: format!(
                    "{DEPENDENCY_TARGET_HANDLE_ID_PREFIX}{index}_{}",
                    dep.table_id.raw()
                ),
                payload: EdgePayload::Dependency(dep.clone()),
                selected: false,
                highlighted: false,
                animated: false,
                hidden,
                z_index: EDGE_LAYER,
            }
        })
        .collect()
}

/// Re-pack target handle indices after edges are removed
///
/// Surviving edges keep their relative order; each target group is
/// renumbered densely from 0 so no index gap survives a removal.
pub fn repack_handle_indices(edges: &mut IndexMap<EdgeId, VisualEdge>) {
    let mut relationship_slots: IndexMap<(TableId, FieldId), u32> = IndexMap::new();
    let mut dependency_slots: IndexMap<TableId, u32> = IndexMap::new();
    for edge in edges.values_mut() {
        match &edge.payload {
            EdgePayload::Relationship(rel) => {
                let slot = relationship_slots
                    .entry((rel.target_table_id, rel.target_field_id))
                    .or_insert(0);
                let index = *slot;
                *slot += 1;
                edge.target_handle = format!(
                    "{TARGET_HANDLE_ID_PREFIX}{index}_{}",
                    rel.target_field_id.raw()
                );
            }
            EdgePayload::Dependency(dep) => {
                let slot = dependency_slots.entry(dep.table_id).or_insert(0);
                let index = *slot;
                *slot += 1;
                edge.target_handle = format!(
                    "{DEPENDENCY_TARGET_HANDLE_ID_PREFIX}{index}_{}",
                    dep.table_id.raw()
                );
            }
        }
    }
}
