//! Selection synchronizer
//!
//! Keeps the derived selected-id lists and the edge highlight state
//! consistent with the per-node/per-edge selection flags.

use crate::node::{EDGE_LAYER, EDGE_RAISED_LAYER};
use crate::state::SyncState;
use indexmap::IndexSet;
use tabula_core::TableId;

/// Re-derive selection lists and edge highlight state
///
/// Uses structural equality to skip redundant list writes. An edge is
/// highlighted when it is directly selected or when either endpoint table
/// is selected; highlighted edges are animated and raised above
/// non-highlighted edges.
///
/// Returns true when either derived id list changed.
pub fn sync_selection(state: &mut SyncState) -> bool {
    let tables: Vec<TableId> = state
        .nodes
        .values()
        .filter(|node| node.selected)
        .filter_map(|node| node.table_id())
        .collect();
    let edges: Vec<_> = state
        .edges
        .values()
        .filter(|edge| edge.selected)
        .map(|edge| edge.id)
        .collect();

    let changed = tables != state.selected_table_ids || edges != state.selected_edge_ids;
    if changed {
        state.selected_table_ids = tables;
        state.selected_edge_ids = edges;
    }

    let selected_tables: IndexSet<TableId> = state.selected_table_ids.iter().copied().collect();
    for edge in state.edges.values_mut() {
        let highlighted = edge.selected
            || selected_tables.contains(&edge.source_table_id)
            || selected_tables.contains(&edge.target_table_id);
        edge.highlighted = highlighted;
        edge.animated = highlighted;
        edge.z_index = if highlighted {
            EDGE_RAISED_LAYER
        } else {
            EDGE_LAYER
        };
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{
        EdgeId, EdgeKind, EdgePayload, NodeId, NodeKind, NodePayload, VisualEdge, VisualNode,
        TABLE_LAYER,
    };
    use tabula_core::geometry::Point;
    use tabula_core::{FieldId, Relationship, RelationshipId, Table};

    fn state_with_edge() -> SyncState {
        let mut state = SyncState::new(0, 0, 0);
        for id in [1u64, 2] {
            let node = VisualNode {
                id: NodeId::Table(id.into()),
                kind: NodeKind::Table,
                position: Point::default(),
                measured: None,
                payload: NodePayload::Table(Table::new(id, format!("t{id}"))),
                overlapping: false,
                highlighted: false,
                dragging: false,
                resizing: false,
                selected: false,
                hidden: false,
                z_index: TABLE_LAYER,
            };
            state.nodes.insert(node.id, node);
        }
        let rel = Relationship {
            id: RelationshipId::new(10),
            source_table_id: 1.into(),
            source_field_id: FieldId::new(1),
            target_table_id: 2.into(),
            target_field_id: FieldId::new(2),
        };
        let edge = VisualEdge {
            id: EdgeId::Relationship(rel.id),
            kind: EdgeKind::Relationship,
            source_table_id: rel.source_table_id,
            target_table_id: rel.target_table_id,
            source_handle: "source_1".into(),
            target_handle: "target_0_2".into(),
            payload: EdgePayload::Relationship(rel),
            selected: false,
            highlighted: false,
            animated: false,
            hidden: false,
            z_index: EDGE_LAYER,
        };
        state.edges.insert(edge.id, edge);
        state
    }

    #[test]
    fn test_endpoint_selection_highlights_edge() {
        let mut state = state_with_edge();
        state.nodes[&NodeId::Table(1.into())].selected = true;

        assert!(sync_selection(&mut state));
        let edge = state.edges.values().next().unwrap();
        assert!(edge.highlighted, "edge was never directly selected");
        assert!(edge.animated);
        assert_eq!(edge.z_index, EDGE_RAISED_LAYER);
        assert_eq!(state.selected_table_ids(), &[TableId::new(1)]);
    }

    #[test]
    fn test_redundant_sync_reports_no_change() {
        let mut state = state_with_edge();
        state.nodes[&NodeId::Table(1.into())].selected = true;
        assert!(sync_selection(&mut state));
        assert!(!sync_selection(&mut state));
    }

    #[test]
    fn test_deselect_clears_highlight() {
        let mut state = state_with_edge();
        state.nodes[&NodeId::Table(1.into())].selected = true;
        sync_selection(&mut state);

        state.nodes[&NodeId::Table(1.into())].selected = false;
        assert!(sync_selection(&mut state));
        let edge = state.edges.values().next().unwrap();
        assert!(!edge.highlighted);
        assert!(!edge.animated);
        assert_eq!(edge.z_index, EDGE_LAYER);
    }

    #[test]
    fn test_direct_edge_selection_highlights() {
        let mut state = state_with_edge();
        let edge_id = EdgeId::Relationship(RelationshipId::new(10));
        state.edges[&edge_id].selected = true;

        assert!(sync_selection(&mut state));
        assert_eq!(state.selected_edge_ids(), &[edge_id]);
        assert!(state.edges[&edge_id].highlighted);
    }
}
