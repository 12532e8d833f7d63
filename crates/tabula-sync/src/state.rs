//! The single-writer synchronization state container
//!
//! `SyncState` owns every derived collection the rendering surface reads:
//! visual nodes, visual edges, the overlap graph, and the selection lists.
//! It is passed by reference to the subordinate operations (projection,
//! reconciliation, event consumption, selection sync), which recompute
//! derived collections via pure functions rather than scattering in-place
//! mutation.

use crate::debounce::{Debounce, Tick};
use crate::node::{EdgeId, NodeId, VisualEdge, VisualNode};
use crate::overlap::OverlapGraph;
use indexmap::{IndexMap, IndexSet};
use tabula_core::TableId;

/// Shared mutable synchronization state, single writer
#[derive(Debug, Clone)]
pub struct SyncState {
    pub(crate) nodes: IndexMap<NodeId, VisualNode>,
    pub(crate) edges: IndexMap<EdgeId, VisualEdge>,
    pub(crate) overlap: OverlapGraph,
    pub(crate) selected_table_ids: Vec<TableId>,
    pub(crate) selected_edge_ids: Vec<EdgeId>,
    /// Settle debounce for position/size bursts
    pub(crate) settle: Debounce,
    /// Tables awaiting an incremental overlap update on settle
    pub(crate) settle_dirty: IndexSet<TableId>,
    /// Post-load fit-to-view debounce
    pub(crate) fit: Debounce,
    /// Transient highlight pulse debounce
    pub(crate) pulse: Debounce,
    /// Tables highlighted by the current pulse
    pub(crate) pulsed: IndexSet<TableId>,
    /// Overlap version the node flags were last refreshed against
    overlap_flag_version: u64,
}

impl SyncState {
    /// Create an empty state with the given debounce delays
    pub(crate) fn new(settle_delay: Tick, fit_delay: Tick, pulse_duration: Tick) -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            overlap: OverlapGraph::new(),
            selected_table_ids: Vec::new(),
            selected_edge_ids: Vec::new(),
            settle: Debounce::new(settle_delay),
            settle_dirty: IndexSet::new(),
            fit: Debounce::new(fit_delay),
            pulse: Debounce::new(pulse_duration),
            pulsed: IndexSet::new(),
            overlap_flag_version: 0,
        }
    }

    /// All visual nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &VisualNode> {
        self.nodes.values()
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Option<&VisualNode> {
        self.nodes.get(&id)
    }

    /// All visual edges, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &VisualEdge> {
        self.edges.values()
    }

    /// Look up an edge by id
    pub fn edge(&self, id: EdgeId) -> Option<&VisualEdge> {
        self.edges.get(&id)
    }

    /// The derived overlap graph
    pub fn overlap(&self) -> &OverlapGraph {
        &self.overlap
    }

    /// Ids of currently selected tables
    pub fn selected_table_ids(&self) -> &[TableId] {
        &self.selected_table_ids
    }

    /// Ids of currently selected edges
    pub fn selected_edge_ids(&self) -> &[EdgeId] {
        &self.selected_edge_ids
    }

    /// Re-derive each table node's `overlapping` flag from the graph
    ///
    /// Cheap to call after every graph write: the version counter makes
    /// the no-change case O(1).
    pub(crate) fn refresh_overlap_flags(&mut self) {
        if self.overlap_flag_version == self.overlap.version() {
            return;
        }
        for node in self.nodes.values_mut() {
            if let Some(id) = node.table_id() {
                node.overlapping = self.overlap.is_overlapping(id);
            }
        }
        self.overlap_flag_version = self.overlap.version();
    }
}
