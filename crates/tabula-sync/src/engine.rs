//! The synchronization engine facade
//!
//! `SyncEngine` is the single writer for the whole subsystem: it owns the
//! domain store and the visual state, routes surface changes through
//! reconciliation, drains the store's event outbox through the consumer,
//! and drives the tick-based debounces. The host event loop calls
//! `apply_changes`/`connect` on input, `tick` once per frame, and reads
//! the node/edge collections back for rendering.

use crate::consume::{self, ConsumeCtx};
use crate::debounce::{DebouncedWriter, Tick};
use crate::error::Result;
use crate::node::{EdgeKind, NodeId, NodePayload};
use crate::project;
use crate::reconcile::{self, ReconcileOutcome, SurfaceChange};
use crate::select;
use crate::state::SyncState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::mem;
use tabula_core::{
    Area, AreaId, AreaPatch, DatabaseKind, DependencyId, Diagram, DiagramStore, DomainEvent,
    Field, FieldId, RelationshipDraft, RelationshipId, SchemaFilter, Table, TableId, TablePatch,
};

/// Debounce delays, in host ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Delay before a position/size burst settles into an overlap update
    pub settle_delay: Tick,
    /// Delay before a loaded diagram requests a fit-to-view
    pub fit_delay: Tick,
    /// How long a highlight pulse stays lit
    pub pulse_duration: Tick,
    /// Delay before a staged rename commits
    pub rename_delay: Tick,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            settle_delay: 200,
            fit_delay: 500,
            pulse_duration: 1000,
            rename_delay: 500,
        }
    }
}

impl SyncConfig {
    pub fn settle_delay(mut self, ticks: Tick) -> Self {
        self.settle_delay = ticks;
        self
    }

    pub fn fit_delay(mut self, ticks: Tick) -> Self {
        self.fit_delay = ticks;
        self
    }

    pub fn pulse_duration(mut self, ticks: Tick) -> Self {
        self.pulse_duration = ticks;
        self
    }

    pub fn rename_delay(mut self, ticks: Tick) -> Self {
        self.rename_delay = ticks;
        self
    }
}

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

/// A non-fatal, user-visible notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// A connect gesture between two field handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub source_table_id: TableId,
    pub source_field_id: FieldId,
    pub target_table_id: TableId,
    pub target_field_id: FieldId,
}

/// The diagram synchronization engine, single writer for store and state
#[derive(Debug)]
pub struct SyncEngine {
    store: DiagramStore,
    state: SyncState,
    rename: DebouncedWriter<(TableId, String)>,
    notices: Vec<Notice>,
    fit_requested: bool,
    show_dependencies: bool,
    read_only: bool,
}

impl SyncEngine {
    /// Create an engine with default delays for the given dialect
    pub fn new(database: DatabaseKind) -> Self {
        Self::with_config(database, SyncConfig::default())
    }

    /// Create an engine with explicit delays
    pub fn with_config(database: DatabaseKind, config: SyncConfig) -> Self {
        Self {
            store: DiagramStore::new(database),
            state: SyncState::new(config.settle_delay, config.fit_delay, config.pulse_duration),
            rename: DebouncedWriter::new(config.rename_delay),
            notices: Vec::new(),
            fit_requested: false,
            show_dependencies: false,
            read_only: false,
        }
    }

    // ========================================================================
    // Read surface
    // ========================================================================

    /// The authoritative domain store
    pub fn store(&self) -> &DiagramStore {
        &self.store
    }

    /// The derived visual state
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Whether removals are currently filtered out
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Whether dependency edges are shown by preference
    pub fn show_dependencies(&self) -> bool {
        self.show_dependencies
    }

    /// Drain accumulated user-visible notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        mem::take(&mut self.notices)
    }

    /// True once after the post-load fit debounce settles
    pub fn take_fit_request(&mut self) -> bool {
        mem::take(&mut self.fit_requested)
    }

    // ========================================================================
    // Scheduling surface
    // ========================================================================

    /// Replace the whole diagram and re-project everything
    pub fn load(&mut self, diagram: Diagram, now: Tick) {
        self.store.load(diagram);
        self.pump(now);
    }

    /// Drain and apply pending domain events, in emission order
    pub fn pump(&mut self, now: Tick) {
        for event in self.store.drain_events() {
            if let DomainEvent::RemoveTables { table_ids } = &event {
                // a staged rename for a removed table must never fire
                let stale = self
                    .rename
                    .pending_value()
                    .is_some_and(|(staged, _)| table_ids.contains(staged));
                if stale {
                    self.rename.cancel();
                }
            }
            let ctx = ConsumeCtx {
                filter: self.store.schema_filter(),
                show_dependencies: self.show_dependencies,
                database: self.store.database(),
            };
            consume::apply_event(&mut self.state, ctx, event, now);
        }
    }

    /// Apply a batch of surface changes, then pump the resulting events
    pub fn apply_changes(&mut self, changes: Vec<SurfaceChange>, now: Tick) -> ReconcileOutcome {
        let outcome = reconcile::apply_surface_changes(
            &mut self.state,
            &mut self.store,
            changes,
            self.read_only,
            now,
        );
        if outcome.removals_filtered > 0 {
            self.notices
                .push(Notice::info("diagram is read-only, removal ignored"));
        }
        self.pump(now);
        outcome
    }

    /// Fire due debounces
    pub fn tick(&mut self, now: Tick) {
        if self.state.settle.fire(now) {
            let dirty: Vec<TableId> = self.state.settle_dirty.drain(..).collect();
            self.state.overlap.update_nodes(dirty, &self.state.nodes);
            self.state.refresh_overlap_flags();
        }
        if self.state.fit.fire(now) {
            self.fit_requested = true;
        }
        if self.state.pulse.fire(now) {
            let pulsed: Vec<TableId> = self.state.pulsed.drain(..).collect();
            for id in pulsed {
                if let Some(node) = self.state.nodes.get_mut(&NodeId::Table(id)) {
                    node.highlighted = false;
                }
            }
        }
        if let Some((table_id, name)) = self.rename.poll(now) {
            self.commit_rename(table_id, name, now);
        }
    }

    // ========================================================================
    // Gesture surface
    // ========================================================================

    /// Handle a connect gesture between two field handles
    ///
    /// Endpoint fields must exist and the active dialect must allow the
    /// type pairing; an incompatible pairing records one warning notice and
    /// creates nothing. On success the relationship edges are re-projected
    /// so handle indices stay densely packed.
    pub fn connect(&mut self, request: ConnectRequest, now: Tick) -> Option<RelationshipId> {
        let Some(source) = self
            .store
            .field(request.source_table_id, request.source_field_id)
        else {
            tracing::debug!(table = %request.source_table_id, "dropping connect gesture with stale source");
            return None;
        };
        let Some(target) = self
            .store
            .field(request.target_table_id, request.target_field_id)
        else {
            tracing::debug!(table = %request.target_table_id, "dropping connect gesture with stale target");
            return None;
        };

        if !self
            .store
            .database()
            .types_compatible(&source.field_type, &target.field_type)
        {
            let message = format!(
                "cannot connect {} to {}: incompatible field types",
                source.field_type, target.field_type
            );
            tracing::warn!(%message, "connect gesture rejected");
            self.notices.push(Notice::warning(message));
            return None;
        }

        let draft = RelationshipDraft {
            source_table_id: request.source_table_id,
            source_field_id: request.source_field_id,
            target_table_id: request.target_table_id,
            target_field_id: request.target_field_id,
        };
        match self.store.create_relationship(draft) {
            Ok(id) => {
                self.reproject_edges(EdgeKind::Relationship);
                self.pump(now);
                Some(id)
            }
            Err(error) => {
                tracing::debug!(%error, "dropping stale connect gesture");
                None
            }
        }
    }

    /// Highlight a table until the pulse debounce clears it
    pub fn pulse_table(&mut self, table_id: TableId, now: Tick) {
        let Some(node) = self.state.nodes.get_mut(&NodeId::Table(table_id)) else {
            tracing::debug!(table = %table_id, "dropping pulse for unknown table");
            return;
        };
        node.highlighted = true;
        self.state.pulsed.insert(table_id);
        self.state.pulse.arm(now);
    }

    /// Stage a table rename; the latest staged name wins and commits on tick
    pub fn stage_table_rename(&mut self, table_id: TableId, name: impl Into<String>, now: Tick) {
        if self.read_only {
            return;
        }
        if self.store.diagram().table(table_id).is_none() {
            tracing::debug!(table = %table_id, "dropping rename for unknown table");
            return;
        }
        self.rename.write(now, (table_id, name.into()));
    }

    /// Commit any staged rename immediately (teardown path)
    pub fn flush_pending(&mut self, now: Tick) {
        if let Some((table_id, name)) = self.rename.flush() {
            self.commit_rename(table_id, name, now);
        }
    }

    fn commit_rename(&mut self, table_id: TableId, name: String, now: Tick) {
        if let Err(error) = self.store.update_table(table_id, TablePatch::new().rename(name)) {
            tracing::debug!(%error, "dropping stale rename");
            return;
        }
        self.pump(now);
    }

    // ========================================================================
    // Preference surface
    // ========================================================================

    /// Replace the schema-visibility filter and re-derive hidden flags
    pub fn set_schema_filter(&mut self, filter: SchemaFilter) {
        self.store.set_schema_filter(filter);
        let filter = self.store.schema_filter();
        for node in self.state.nodes.values_mut() {
            if let NodePayload::Table(table) = &node.payload {
                node.hidden = !filter.shows(table.schema.as_deref());
            }
        }
        self.state.overlap.recompute_all(self.state.nodes.values());
        self.state.refresh_overlap_flags();
    }

    /// Toggle the dependency-edge visibility preference
    pub fn set_show_dependencies(&mut self, show: bool) {
        self.show_dependencies = show;
        let hidden = !(show || self.store.database().always_shows_dependencies());
        for edge in self.state.edges.values_mut() {
            if edge.kind == EdgeKind::Dependency {
                edge.hidden = hidden;
            }
        }
    }

    /// Toggle read-only mode (a policy gate on removal paths)
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    // ========================================================================
    // Domain mutation surface (forwarded to the store, then pumped)
    // ========================================================================

    /// Add tables to the diagram
    pub fn add_tables(&mut self, tables: Vec<Table>, now: Tick) {
        self.store.add_tables(tables);
        self.pump(now);
    }

    /// Remove tables and everything referencing them
    pub fn remove_tables(&mut self, table_ids: &[TableId], now: Tick) {
        self.store.remove_tables(table_ids);
        self.pump(now);
    }

    /// Add a field to a table
    pub fn add_field(&mut self, table_id: TableId, field: Field, now: Tick) -> Result<()> {
        self.store.add_field(table_id, field)?;
        self.pump(now);
        Ok(())
    }

    /// Remove a field from a table
    pub fn remove_field(&mut self, table_id: TableId, field_id: FieldId, now: Tick) -> Result<()> {
        self.store.remove_field(table_id, field_id)?;
        self.pump(now);
        Ok(())
    }

    /// Patch a table's name, width, or position
    pub fn update_table(&mut self, table_id: TableId, patch: TablePatch, now: Tick) -> Result<()> {
        self.store.update_table(table_id, patch)?;
        self.pump(now);
        Ok(())
    }

    /// Add an area node
    pub fn add_area(&mut self, area: Area, now: Tick) {
        self.store.add_area(area.clone());
        let node = project::area_to_node(&area);
        self.state.nodes.insert(node.id, node);
        self.pump(now);
    }

    /// Patch an area's position or size
    pub fn update_area(&mut self, area_id: AreaId, patch: AreaPatch, now: Tick) -> Result<()> {
        self.store.update_area(area_id, patch.clone())?;
        if let Some(node) = self.state.nodes.get_mut(&NodeId::Area(area_id)) {
            if let Some(position) = patch.position {
                if !node.interaction_active() {
                    node.position = position;
                }
            }
            if let Some(size) = patch.size {
                if !node.interaction_active() {
                    node.measured = Some(size);
                }
            }
            if let (NodePayload::Area(area), Some(position)) = (&mut node.payload, patch.position)
            {
                area.position = position;
            }
            if let (NodePayload::Area(area), Some(size)) = (&mut node.payload, patch.size) {
                area.size = size;
            }
        }
        self.pump(now);
        Ok(())
    }

    /// Remove an area node
    pub fn remove_area(&mut self, area_id: AreaId, now: Tick) {
        self.store.remove_area(area_id);
        self.state.nodes.shift_remove(&NodeId::Area(area_id));
        self.pump(now);
    }

    /// Create a dependency between two tables
    pub fn create_dependency(
        &mut self,
        table_id: TableId,
        dependent_table_id: TableId,
        now: Tick,
    ) -> Result<DependencyId> {
        let id = self.store.create_dependency(table_id, dependent_table_id)?;
        self.reproject_edges(EdgeKind::Dependency);
        self.pump(now);
        Ok(id)
    }

    /// Remove relationships by id
    pub fn remove_relationships(&mut self, ids: &[RelationshipId], now: Tick) {
        self.store.remove_relationships(ids);
        self.reproject_edges(EdgeKind::Relationship);
        self.pump(now);
    }

    /// Remove dependencies by id
    pub fn remove_dependencies(&mut self, ids: &[DependencyId], now: Tick) {
        self.store.remove_dependencies(ids);
        self.reproject_edges(EdgeKind::Dependency);
        self.pump(now);
    }

    /// Rebuild the edges of one kind from the store, keeping the other kind
    ///
    /// Relationship edges come first so dense handle indices stay stable
    /// with respect to projection order. Direct selection carries over.
    fn reproject_edges(&mut self, kind: EdgeKind) {
        let prior = mem::take(&mut self.state.edges);
        let relationship_edges = match kind {
            EdgeKind::Relationship => project::relationships_to_edges(self.store.relationships()),
            EdgeKind::Dependency => prior
                .values()
                .filter(|e| e.kind == EdgeKind::Relationship)
                .cloned()
                .collect(),
        };
        let dependency_edges = match kind {
            EdgeKind::Dependency => project::dependencies_to_edges(
                self.store.dependencies(),
                self.show_dependencies,
                self.store.database(),
            ),
            EdgeKind::Relationship => prior
                .values()
                .filter(|e| e.kind == EdgeKind::Dependency)
                .cloned()
                .collect(),
        };

        let mut edges = IndexMap::new();
        for mut edge in relationship_edges.into_iter().chain(dependency_edges) {
            if let Some(old) = prior.get(&edge.id) {
                edge = edge.carry_selection(old);
            }
            edges.insert(edge.id, edge);
        }
        self.state.edges = edges;
        select::sync_selection(&mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::EdgeId;
    use tabula_core::geometry::{Point, Size};
    use tabula_core::rendered_table_height;

    fn config() -> SyncConfig {
        SyncConfig::default()
            .settle_delay(10)
            .fit_delay(20)
            .pulse_duration(30)
            .rename_delay(10)
    }

    fn diagram() -> Diagram {
        let mut diagram = Diagram::new(DatabaseKind::Postgres);
        diagram.tables.push(
            Table::new(1, "users")
                .at(0.0, 0.0)
                .with_field(Field::new(10, "id", "int8").primary_key())
                .with_field(Field::new(11, "email", "text")),
        );
        diagram.tables.push(
            Table::new(2, "orders")
                .at(400.0, 0.0)
                .with_field(Field::new(20, "id", "int8").primary_key())
                .with_field(Field::new(21, "user_id", "int8"))
                .with_field(Field::new(22, "note", "text")),
        );
        diagram
    }

    fn loaded_engine() -> SyncEngine {
        let mut engine = SyncEngine::with_config(DatabaseKind::Postgres, config());
        engine.load(diagram(), 0);
        // the surface reports initial dimensions
        let changes = engine
            .state()
            .nodes()
            .map(|node| {
                let fields = match &node.payload {
                    NodePayload::Table(table) => table.fields.len(),
                    NodePayload::Area(_) => 0,
                };
                SurfaceChange::NodeDimensions {
                    id: node.id,
                    size: Size::new(224.0, rendered_table_height(fields)),
                    resizing: false,
                }
            })
            .collect();
        engine.apply_changes(changes, 0);
        engine
    }

    fn connect_users_orders() -> ConnectRequest {
        ConnectRequest {
            source_table_id: TableId::new(2),
            source_field_id: FieldId::new(21),
            target_table_id: TableId::new(1),
            target_field_id: FieldId::new(10),
        }
    }

    #[test]
    fn test_drag_burst_settles_into_one_overlap_recompute() {
        let mut engine = loaded_engine();
        let id = NodeId::Table(TableId::new(2));
        let version = engine.state().overlap().version();

        // burst of drag frames moving orders onto users
        for (tick, x) in [(1u64, 300.0), (2, 200.0), (3, 100.0)] {
            let outcome = engine.apply_changes(
                vec![SurfaceChange::NodePosition {
                    id,
                    position: Point::new(x, 0.0),
                    dragging: true,
                }],
                tick,
            );
            assert_eq!(outcome.table_patches, 0);
        }
        engine.tick(4);
        assert_eq!(engine.state().overlap().version(), version);

        // drop
        let outcome = engine.apply_changes(
            vec![SurfaceChange::NodePosition {
                id,
                position: Point::new(50.0, 0.0),
                dragging: false,
            }],
            5,
        );
        assert_eq!(outcome.table_patches, 1);

        engine.tick(15);
        assert_eq!(engine.state().overlap().version(), version + 1);
        assert!(engine.state().node(id).is_some_and(|n| n.overlapping));
        // the domain followed the terminal position
        assert_eq!(
            engine.store().diagram().table(TableId::new(2)).unwrap().position,
            Point::new(50.0, 0.0)
        );
    }

    #[test]
    fn test_compatible_connect_creates_relationship_edge() {
        let mut engine = loaded_engine();
        let id = engine.connect(connect_users_orders(), 0);

        let id = id.expect("int8 to int8 is compatible");
        assert_eq!(engine.store().relationships().len(), 1);
        let edge = engine.state().edge(EdgeId::Relationship(id)).unwrap();
        assert_eq!(edge.target_handle, "target_0_10");
        assert_eq!(edge.source_handle, "source_21");
        assert!(engine.take_notices().is_empty());
    }

    #[test]
    fn test_incompatible_connect_records_one_notice() {
        let mut engine = loaded_engine();
        let request = ConnectRequest {
            source_table_id: TableId::new(2),
            source_field_id: FieldId::new(22), // text
            target_table_id: TableId::new(1),
            target_field_id: FieldId::new(10), // int8
        };

        assert!(engine.connect(request, 0).is_none());
        assert!(engine.store().relationships().is_empty());
        assert!(engine.state().edges().next().is_none());

        let notices = engine.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].severity, Severity::Warning);
        assert!(engine.take_notices().is_empty(), "drained once");
    }

    #[test]
    fn test_connect_repacks_handle_indices() {
        let mut engine = loaded_engine();
        let first = engine.connect(connect_users_orders(), 0).unwrap();
        let second = engine
            .connect(
                ConnectRequest {
                    source_table_id: TableId::new(2),
                    source_field_id: FieldId::new(20),
                    target_table_id: TableId::new(1),
                    target_field_id: FieldId::new(10),
                },
                0,
            )
            .unwrap();

        let first_edge = engine.state().edge(EdgeId::Relationship(first)).unwrap();
        let second_edge = engine.state().edge(EdgeId::Relationship(second)).unwrap();
        assert_eq!(first_edge.target_handle, "target_0_10");
        assert_eq!(second_edge.target_handle, "target_1_10");
    }

    #[test]
    fn test_edge_removal_repacks_handle_indices() {
        let mut engine = loaded_engine();
        let first = engine.connect(connect_users_orders(), 0).unwrap();
        let second = engine
            .connect(
                ConnectRequest {
                    source_table_id: TableId::new(2),
                    source_field_id: FieldId::new(20),
                    target_table_id: TableId::new(1),
                    target_field_id: FieldId::new(10),
                },
                0,
            )
            .unwrap();
        assert_eq!(
            engine
                .state()
                .edge(EdgeId::Relationship(second))
                .unwrap()
                .target_handle,
            "target_1_10"
        );

        engine.apply_changes(
            vec![SurfaceChange::EdgeRemove {
                id: EdgeId::Relationship(first),
            }],
            0,
        );

        // the survivor closes the gap left by the index-0 edge
        let survivor = engine.state().edge(EdgeId::Relationship(second)).unwrap();
        assert_eq!(survivor.target_handle, "target_0_10");
    }

    #[test]
    fn test_selecting_table_highlights_its_edges() {
        let mut engine = loaded_engine();
        let rel = engine.connect(connect_users_orders(), 0).unwrap();

        engine.apply_changes(
            vec![SurfaceChange::NodeSelect {
                id: NodeId::Table(TableId::new(1)),
                selected: true,
            }],
            0,
        );

        assert_eq!(engine.state().selected_table_ids(), &[TableId::new(1)]);
        let edge = engine.state().edge(EdgeId::Relationship(rel)).unwrap();
        assert!(edge.highlighted);
        assert!(edge.animated);
    }

    #[test]
    fn test_read_only_blocks_removal_and_rename() {
        let mut engine = loaded_engine();
        engine.set_read_only(true);

        let outcome = engine.apply_changes(
            vec![SurfaceChange::NodeRemove {
                id: NodeId::Table(TableId::new(1)),
            }],
            0,
        );
        assert_eq!(outcome.removals_filtered, 1);
        assert!(engine.store().diagram().table(TableId::new(1)).is_some());
        let notices = engine.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].severity, Severity::Info);

        engine.stage_table_rename(TableId::new(1), "people", 0);
        engine.tick(100);
        assert_eq!(
            engine.store().diagram().table(TableId::new(1)).unwrap().name,
            "users"
        );
    }

    #[test]
    fn test_load_requests_fit_once() {
        let mut engine = loaded_engine();
        assert!(!engine.take_fit_request());

        engine.tick(19);
        assert!(!engine.take_fit_request());
        engine.tick(20);
        assert!(engine.take_fit_request());
        assert!(!engine.take_fit_request(), "a fit request is one-shot");
    }

    #[test]
    fn test_rename_latest_wins_and_commits_on_tick() {
        let mut engine = loaded_engine();
        engine.stage_table_rename(TableId::new(1), "people", 0);
        engine.stage_table_rename(TableId::new(1), "accounts", 5);

        engine.tick(14);
        assert_eq!(
            engine.store().diagram().table(TableId::new(1)).unwrap().name,
            "users"
        );

        engine.tick(15);
        let table = engine.store().diagram().table(TableId::new(1)).unwrap();
        assert_eq!(table.name, "accounts");
        // the node payload followed the committed patch
        let node = engine.state().node(NodeId::Table(TableId::new(1))).unwrap();
        let NodePayload::Table(payload) = &node.payload else {
            panic!("table payload expected");
        };
        assert_eq!(payload.name, "accounts");
    }

    #[test]
    fn test_rename_cancelled_when_table_removed() {
        let mut engine = loaded_engine();
        engine.stage_table_rename(TableId::new(1), "people", 0);
        engine.remove_tables(&[TableId::new(1)], 1);

        engine.tick(100);
        engine.flush_pending(100);
        assert!(engine.store().diagram().table(TableId::new(1)).is_none());
    }

    #[test]
    fn test_flush_pending_commits_immediately() {
        let mut engine = loaded_engine();
        engine.stage_table_rename(TableId::new(1), "people", 0);
        engine.flush_pending(1);
        assert_eq!(
            engine.store().diagram().table(TableId::new(1)).unwrap().name,
            "people"
        );
    }

    #[test]
    fn test_pulse_highlights_until_debounce_clears() {
        let mut engine = loaded_engine();
        engine.pulse_table(TableId::new(1), 0);

        let id = NodeId::Table(TableId::new(1));
        assert!(engine.state().node(id).unwrap().highlighted);
        engine.tick(29);
        assert!(engine.state().node(id).unwrap().highlighted);
        engine.tick(30);
        assert!(!engine.state().node(id).unwrap().highlighted);
    }

    #[test]
    fn test_dependency_visibility_follows_preference() {
        let mut engine = loaded_engine();
        let dep = engine
            .create_dependency(TableId::new(1), TableId::new(2), 0)
            .unwrap();

        assert!(engine.state().edge(EdgeId::Dependency(dep)).unwrap().hidden);
        engine.set_show_dependencies(true);
        assert!(!engine.state().edge(EdgeId::Dependency(dep)).unwrap().hidden);
        engine.set_show_dependencies(false);
        assert!(engine.state().edge(EdgeId::Dependency(dep)).unwrap().hidden);
    }

    #[test]
    fn test_clickhouse_always_shows_dependencies() {
        let mut engine = SyncEngine::with_config(DatabaseKind::ClickHouse, config());
        let mut diagram = Diagram::new(DatabaseKind::ClickHouse);
        diagram.tables.push(Table::new(1, "events"));
        diagram.tables.push(Table::new(2, "events_mv"));
        engine.load(diagram, 0);

        let dep = engine
            .create_dependency(TableId::new(1), TableId::new(2), 0)
            .unwrap();
        assert!(!engine.state().edge(EdgeId::Dependency(dep)).unwrap().hidden);
    }

    #[test]
    fn test_schema_filter_hides_and_recomputes() {
        let mut engine = SyncEngine::with_config(DatabaseKind::Postgres, config());
        let mut diagram = Diagram::new(DatabaseKind::Postgres);
        diagram
            .tables
            .push(Table::new(1, "users").in_schema("public").at(0.0, 0.0));
        diagram
            .tables
            .push(Table::new(2, "audit").in_schema("audit").at(10.0, 10.0));
        engine.load(diagram, 0);
        for id in [1u64, 2] {
            engine.apply_changes(
                vec![SurfaceChange::NodeDimensions {
                    id: NodeId::Table(TableId::new(id)),
                    size: Size::new(224.0, 100.0),
                    resizing: false,
                }],
                0,
            );
        }
        engine.tick(50);
        assert!(engine.state().overlap().is_overlapping(TableId::new(1)));

        engine.set_schema_filter(SchemaFilter::only(["public"]));
        let audit = engine.state().node(NodeId::Table(TableId::new(2))).unwrap();
        assert!(audit.hidden);
        // hidden tables leave the overlap graph
        assert!(!engine.state().overlap().is_overlapping(TableId::new(1)));
        assert!(!engine
            .state()
            .node(NodeId::Table(TableId::new(1)))
            .unwrap()
            .overlapping);
    }

    #[test]
    fn test_edge_removal_from_surface() {
        let mut engine = loaded_engine();
        let rel = engine.connect(connect_users_orders(), 0).unwrap();

        let outcome = engine.apply_changes(
            vec![SurfaceChange::EdgeRemove {
                id: EdgeId::Relationship(rel),
            }],
            0,
        );
        assert_eq!(outcome.removals_forwarded, 1);
        assert!(engine.store().relationships().is_empty());
        assert!(engine.state().edge(EdgeId::Relationship(rel)).is_none());
    }

    #[test]
    fn test_table_removal_prunes_edges_and_graph() {
        let mut engine = loaded_engine();
        let rel = engine.connect(connect_users_orders(), 0).unwrap();

        engine.apply_changes(
            vec![SurfaceChange::NodeRemove {
                id: NodeId::Table(TableId::new(1)),
            }],
            0,
        );
        assert!(engine.store().diagram().table(TableId::new(1)).is_none());
        assert!(engine.state().node(NodeId::Table(TableId::new(1))).is_none());
        assert!(engine.state().edge(EdgeId::Relationship(rel)).is_none());
        assert!(!engine.state().overlap().contains(TableId::new(1)));
    }

    #[test]
    fn test_field_add_then_remove_nets_original_height() {
        let mut engine = loaded_engine();
        let id = NodeId::Table(TableId::new(1));
        let before = engine.state().node(id).unwrap().measured;

        engine
            .add_field(TableId::new(1), Field::new(12, "phone", "text"), 0)
            .unwrap();
        let grown = engine.state().node(id).unwrap().measured;
        assert_ne!(before, grown);

        engine.remove_field(TableId::new(1), FieldId::new(12), 0).unwrap();
        assert_eq!(engine.state().node(id).unwrap().measured, before);
    }

    #[test]
    fn test_stale_connect_is_dropped_silently() {
        let mut engine = loaded_engine();
        let request = ConnectRequest {
            source_table_id: TableId::new(99),
            source_field_id: FieldId::new(1),
            target_table_id: TableId::new(1),
            target_field_id: FieldId::new(10),
        };
        assert!(engine.connect(request, 0).is_none());
        assert!(engine.take_notices().is_empty(), "stale is not a notice");
    }

    #[test]
    fn test_area_moves_with_tables_untouched() {
        let mut engine = loaded_engine();
        engine.tick(10);
        engine.add_area(
            Area::new(50, "billing").at(0.0, 0.0).sized(500.0, 400.0),
            0,
        );

        let outcome = engine.apply_changes(
            vec![SurfaceChange::NodePosition {
                id: NodeId::Area(AreaId::new(50)),
                position: Point::new(20.0, 30.0),
                dragging: false,
            }],
            0,
        );
        assert_eq!(outcome.area_patches, 1);
        assert_eq!(outcome.table_patches, 0);
        assert_eq!(
            engine.store().areas()[0].position,
            Point::new(20.0, 30.0)
        );
        // areas never join the overlap graph
        assert_eq!(engine.state().overlap().vertex_count(), 2);
    }
}
