//! Visual node and edge records
//!
//! Rendering-facing projections of domain entities plus transient
//! interaction state. Each visual id maps to exactly one domain entity id.

use serde::{Deserialize, Serialize};
use std::fmt;
use tabula_core::geometry::{Point, Rect, Size};
use tabula_core::{Area, AreaId, Dependency, DependencyId, Relationship, RelationshipId, Table, TableId};

/// Draw layer for area nodes, always behind tables
pub const AREA_LAYER: i32 = -1;

/// Draw layer for table nodes
pub const TABLE_LAYER: i32 = 0;

/// Draw layer for non-highlighted edges
pub const EDGE_LAYER: i32 = 0;

/// Draw layer for highlighted edges
pub const EDGE_RAISED_LAYER: i32 = 1;

/// Identifier of a visual node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Table(TableId),
    Area(AreaId),
}

impl NodeId {
    /// The table id, when this node is a table
    pub fn as_table(&self) -> Option<TableId> {
        match self {
            NodeId::Table(id) => Some(*id),
            NodeId::Area(_) => None,
        }
    }

    /// The area id, when this node is an area
    pub fn as_area(&self) -> Option<AreaId> {
        match self {
            NodeId::Area(id) => Some(*id),
            NodeId::Table(_) => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Table(id) => write!(f, "{}", id),
            NodeId::Area(id) => write!(f, "{}", id),
        }
    }
}

/// Identifier of a visual edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeId {
    Relationship(RelationshipId),
    Dependency(DependencyId),
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeId::Relationship(id) => write!(f, "{}", id),
            EdgeId::Dependency(id) => write!(f, "{}", id),
        }
    }
}

/// The kind of node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Table,
    Area,
}

/// The kind of edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    Relationship,
    Dependency,
}

/// Domain payload carried by a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodePayload {
    Table(Table),
    Area(Area),
}

/// Domain payload carried by an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgePayload {
    Relationship(Relationship),
    Dependency(Dependency),
}

/// A rendering-facing node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Interaction-owned while dragging, domain-owned otherwise
    pub position: Point,
    /// Authoritative only after the rendering surface reports dimensions
    pub measured: Option<Size>,
    pub payload: NodePayload,
    pub overlapping: bool,
    pub highlighted: bool,
    pub dragging: bool,
    pub resizing: bool,
    pub selected: bool,
    pub hidden: bool,
    pub z_index: i32,
}

impl VisualNode {
    /// Rectangle occupied on screen, when the node has trustworthy dimensions
    pub fn rect(&self) -> Option<Rect> {
        let measured = self.measured?;
        Some(Rect::from_parts(self.position, measured))
    }

    /// The table id, when this node is a table
    pub fn table_id(&self) -> Option<TableId> {
        self.id.as_table()
    }

    /// Whether a continuous interaction owns this node right now
    pub fn interaction_active(&self) -> bool {
        self.dragging || self.resizing
    }

    /// Merge-on-read carry from the prior rendering-facing node
    ///
    /// While an interaction is active on the prior node, its {position,
    /// measured, dragging, resizing} stay authoritative; otherwise the
    /// domain-derived values win. Measured dimensions are also carried when
    /// the fresh projection has none, since only the rendering surface can
    /// produce them. Selection and transient highlight always carry;
    /// overlap flags are refreshed from the graph after projection.
    pub fn carry_interaction(mut self, prior: &VisualNode) -> Self {
        self.selected = prior.selected;
        self.highlighted = prior.highlighted;
        self.overlapping = prior.overlapping;
        if prior.interaction_active() {
            self.position = prior.position;
            self.measured = prior.measured;
            self.dragging = prior.dragging;
            self.resizing = prior.resizing;
        } else if self.measured.is_none() {
            self.measured = prior.measured;
        }
        self
    }
}

/// A rendering-facing edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualEdge {
    pub id: EdgeId,
    pub kind: EdgeKind,
    pub source_table_id: TableId,
    pub target_table_id: TableId,
    /// Handle id on the source table
    pub source_handle: String,
    /// Handle id on the target table; carries the per-target handle index
    pub target_handle: String,
    pub payload: EdgePayload,
    pub selected: bool,
    pub highlighted: bool,
    pub animated: bool,
    pub hidden: bool,
    pub z_index: i32,
}

impl VisualEdge {
    /// Carry direct selection from the prior edge across a re-projection
    ///
    /// Highlight, animation, and draw priority are derived state and get
    /// recomputed by the selection synchronizer.
    pub fn carry_selection(mut self, prior: &VisualEdge) -> Self {
        self.selected = prior.selected;
        self
    }
}
