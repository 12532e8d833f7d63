//! Overlap graph: which table rectangles collide on screen
//!
//! A purely derived structure, recomputable at any time from the current
//! rectangles. Consumers detect change through the O(1) monotonic version
//! counter rather than deep equality. Adjacency iteration follows input
//! iteration order within a single computation.

use crate::node::{NodeId, NodeKind, VisualNode};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tabula_core::geometry::Rect;
use tabula_core::TableId;

/// Undirected adjacency of colliding table nodes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlapGraph {
    adjacency: IndexMap<TableId, IndexSet<TableId>>,
    version: u64,
}

impl OverlapGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic version counter, bumped on every adjacency-changing write
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the vertex is present
    pub fn contains(&self, id: TableId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Tables whose rectangles collide with the given one
    pub fn neighbors(&self, id: TableId) -> impl Iterator<Item = TableId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    /// Whether the table collides with at least one other table
    pub fn is_overlapping(&self, id: TableId) -> bool {
        self.adjacency.get(&id).is_some_and(|set| !set.is_empty())
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Full O(n²) recompute over the given nodes
    ///
    /// Used on initial load and visibility-filter changes. Vertices are the
    /// visible, measured table nodes; everything else contributes nothing.
    pub fn recompute_all<'a, I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = &'a VisualNode>,
    {
        let rects: Vec<(TableId, Rect)> = nodes
            .into_iter()
            .filter_map(|node| Some((node.table_id()?, usable_rect(node)?)))
            .collect();

        let mut adjacency: IndexMap<TableId, IndexSet<TableId>> = IndexMap::new();
        for (id, _) in &rects {
            adjacency.entry(*id).or_default();
        }
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                if rects[i].1.intersects(&rects[j].1) {
                    adjacency[&rects[i].0].insert(rects[j].0);
                    adjacency[&rects[j].0].insert(rects[i].0);
                }
            }
        }

        if adjacency != self.adjacency {
            self.adjacency = adjacency;
            self.version += 1;
        }
    }

    /// Recompute the adjacency of one changed node, leaving the rest untouched
    pub fn update_node(&mut self, changed: TableId, nodes: &IndexMap<NodeId, VisualNode>) {
        if self.update_row(changed, nodes) {
            self.version += 1;
        }
    }

    /// Recompute several changed nodes with a single version bump
    pub fn update_nodes<I>(&mut self, changed: I, nodes: &IndexMap<NodeId, VisualNode>)
    where
        I: IntoIterator<Item = TableId>,
    {
        let mut dirty = false;
        for id in changed {
            dirty |= self.update_row(id, nodes);
        }
        if dirty {
            self.version += 1;
        }
    }

    /// Drop a vertex and every edge referencing it
    pub fn remove_vertex(&mut self, id: TableId) {
        let Some(neighbors) = self.adjacency.shift_remove(&id) else {
            return;
        };
        for neighbor in neighbors {
            if let Some(set) = self.adjacency.get_mut(&neighbor) {
                set.shift_remove(&id);
            }
        }
        self.version += 1;
    }

    /// Returns true when the write changed the adjacency
    fn update_row(&mut self, changed: TableId, nodes: &IndexMap<NodeId, VisualNode>) -> bool {
        let Some(node) = nodes.get(&NodeId::Table(changed)) else {
            // a pending update for a node that no longer exists is stale
            tracing::debug!(table = %changed, "skipping overlap update for missing node");
            return false;
        };

        let fresh: IndexSet<TableId> = match usable_rect(node) {
            Some(rect) => nodes
                .values()
                .filter_map(|other| {
                    let other_id = other.table_id()?;
                    if other_id == changed {
                        return None;
                    }
                    let other_rect = usable_rect(other)?;
                    rect.intersects(&other_rect).then_some(other_id)
                })
                .collect(),
            // hidden or unmeasured nodes contribute no rectangle
            None => IndexSet::new(),
        };

        let prior = self.adjacency.get(&changed).cloned().unwrap_or_default();
        if prior == fresh && self.adjacency.contains_key(&changed) {
            return false;
        }

        for gone in prior.difference(&fresh) {
            if let Some(set) = self.adjacency.get_mut(gone) {
                set.shift_remove(&changed);
            }
        }
        for added in fresh.difference(&prior) {
            self.adjacency.entry(*added).or_default().insert(changed);
        }
        self.adjacency.insert(changed, fresh);
        true
    }
}

/// Rectangle a node contributes to the overlap computation
///
/// Only visible table nodes with surface-reported dimensions take part;
/// an unmeasured node's rectangle is not yet trustworthy.
fn usable_rect(node: &VisualNode) -> Option<Rect> {
    if node.kind != NodeKind::Table || node.hidden {
        return None;
    }
    node.rect()
}
