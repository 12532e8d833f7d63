//! Tabula Sync - diagram synchronization engine
//!
//! Keeps the authoritative domain model from `tabula-core` consistent with
//! a rendered graph of positioned, resizable nodes and connecting edges,
//! while maintaining a derived overlap graph that flags tables whose
//! on-screen rectangles collide.
//!
//! ## Architecture
//!
//! ```text
//! SyncEngine (owns DiagramStore + SyncState)
//!  │
//!  ├── project    domain entities → visual nodes/edges (pure)
//!  ├── overlap    table-rectangle collision adjacency
//!  ├── reconcile  surface changes → sanitized state + domain patches
//!  ├── consume    domain events → targeted visual patches
//!  └── select     selection flags → id lists + edge highlights
//! ```
//!
//! ## Design Principles
//!
//! 1. **Single writer** - all node/edge/overlap mutation flows through
//!    `SyncEngine`; domain-driven projection, interaction-driven
//!    reconciliation, and event-consumer patches in the same scheduling
//!    turn observe each other's results in a defined order
//! 2. **Closed event unions** - `DomainEvent` and `SurfaceChange` dispatch
//!    via exhaustive matching; a new kind is a compile-time-checked addition
//! 3. **Merge-on-read** - domain-driven re-projection carries transient
//!    interaction state only while an interaction is active
//! 4. **No fatal failures** - stale ids are dropped, malformed numerics are
//!    sanitized, policy violations are filtered, incompatible connections
//!    become user-visible notices

pub mod consume;
pub mod debounce;
mod engine;
mod error;
mod node;
pub mod overlap;
pub mod project;
pub mod reconcile;
pub mod select;
mod state;

pub use debounce::{Debounce, DebouncedWriter, Tick};
pub use engine::{ConnectRequest, Notice, Severity, SyncConfig, SyncEngine};
pub use error::{Error, Result};
pub use node::{
    EdgeId, EdgeKind, EdgePayload, NodeId, NodeKind, NodePayload, VisualEdge, VisualNode,
    AREA_LAYER, EDGE_LAYER, EDGE_RAISED_LAYER, TABLE_LAYER,
};
pub use overlap::OverlapGraph;
pub use reconcile::{ReconcileOutcome, SurfaceChange};
pub use state::SyncState;
