//! The authoritative diagram store
//!
//! `DiagramStore` is the single writer of the domain model. Structural
//! mutations emit self-contained [`DomainEvent`]s into an ordered outbox
//! that the sync layer drains; interaction-originated state patches
//! (`update_tables_state`, `update_area`) are silent, because the surface
//! that produced them already holds the new values and emitting events for
//! them would feed the surface its own changes back.

use crate::geometry::{sanitize, Point, Size};
use crate::{
    Area, AreaId, DatabaseKind, Dependency, DependencyId, Diagram, DomainEvent, Error, Field,
    FieldId, Relationship, RelationshipId, Result, SchemaFilter, Table, TableId,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A structural edit to one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePatch {
    pub name: Option<String>,
    pub width: Option<f64>,
    pub position: Option<Point>,
}

impl TablePatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the table
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set an explicit width
    pub fn resize(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Move the table
    pub fn move_to(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Whether the patch changes anything
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.width.is_none() && self.position.is_none()
    }
}

/// One entry of the batched interaction patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStateUpdate {
    pub table_id: TableId,
    pub position: Option<Point>,
    pub width: Option<f64>,
}

/// A silent position/size patch to one area
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
}

/// Everything needed to create a relationship from a connect gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDraft {
    pub source_table_id: TableId,
    pub source_field_id: FieldId,
    pub target_table_id: TableId,
    pub target_field_id: FieldId,
}

/// The single-writer domain store with an ordered event outbox
#[derive(Debug, Clone, Default)]
pub struct DiagramStore {
    diagram: Diagram,
    filter: SchemaFilter,
    events: VecDeque<DomainEvent>,
    next_id: u64,
}

impl DiagramStore {
    /// Create an empty store for the given dialect
    pub fn new(database: DatabaseKind) -> Self {
        Self::from_diagram(Diagram::new(database))
    }

    /// Create a store seeded with an existing diagram (no event emitted)
    pub fn from_diagram(diagram: Diagram) -> Self {
        let next_id = next_free_id(&diagram);
        Self {
            diagram,
            filter: SchemaFilter::all(),
            events: VecDeque::new(),
            next_id,
        }
    }

    // ========================================================================
    // Query surface
    // ========================================================================

    /// The current diagram
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// The active dialect
    pub fn database(&self) -> DatabaseKind {
        self.diagram.database
    }

    /// All tables
    pub fn tables(&self) -> &[Table] {
        &self.diagram.tables
    }

    /// All areas
    pub fn areas(&self) -> &[Area] {
        &self.diagram.areas
    }

    /// All relationships
    pub fn relationships(&self) -> &[Relationship] {
        &self.diagram.relationships
    }

    /// All dependencies
    pub fn dependencies(&self) -> &[Dependency] {
        &self.diagram.dependencies
    }

    /// Look up a field by table and field id
    pub fn field(&self, table_id: TableId, field_id: FieldId) -> Option<&Field> {
        self.diagram.field(table_id, field_id)
    }

    /// The current schema-visibility filter
    pub fn schema_filter(&self) -> &SchemaFilter {
        &self.filter
    }

    /// Replace the schema-visibility filter
    pub fn set_schema_filter(&mut self, filter: SchemaFilter) {
        self.filter = filter;
    }

    // ========================================================================
    // Event surface
    // ========================================================================

    /// Drain queued events in emission order
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        self.events.drain(..).collect()
    }

    fn emit(&mut self, event: DomainEvent) {
        tracing::debug!(kind = event.kind_name(), "domain event");
        self.events.push_back(event);
    }

    // ========================================================================
    // Mutation surface
    // ========================================================================

    /// Replace the whole diagram
    pub fn load(&mut self, diagram: Diagram) {
        self.next_id = next_free_id(&diagram);
        self.diagram = diagram.clone();
        self.emit(DomainEvent::LoadDiagram { diagram });
    }

    /// Add tables to the diagram
    pub fn add_tables(&mut self, tables: Vec<Table>) {
        if tables.is_empty() {
            return;
        }
        self.diagram.tables.extend(tables.iter().cloned());
        self.bump_next_id();
        self.emit(DomainEvent::AddTables { tables });
    }

    /// Remove tables and everything referencing them
    pub fn remove_tables(&mut self, table_ids: &[TableId]) {
        let present: Vec<TableId> = table_ids
            .iter()
            .copied()
            .filter(|id| self.diagram.table(*id).is_some())
            .collect();
        if present.is_empty() {
            return;
        }
        self.diagram.tables.retain(|t| !present.contains(&t.id));
        self.diagram
            .relationships
            .retain(|r| !present.contains(&r.source_table_id) && !present.contains(&r.target_table_id));
        self.diagram
            .dependencies
            .retain(|d| !present.contains(&d.table_id) && !present.contains(&d.dependent_table_id));
        self.emit(DomainEvent::RemoveTables { table_ids: present });
    }

    /// Append a field to a table
    pub fn add_field(&mut self, table_id: TableId, field: Field) -> Result<()> {
        let table = self
            .diagram
            .table_mut(table_id)
            .ok_or(Error::UnknownTable(table_id))?;
        table.fields.push(field.clone());
        self.bump_next_id();
        self.emit(DomainEvent::AddField { table_id, field });
        Ok(())
    }

    /// Remove a field from a table
    pub fn remove_field(&mut self, table_id: TableId, field_id: FieldId) -> Result<()> {
        let table = self
            .diagram
            .table_mut(table_id)
            .ok_or(Error::UnknownTable(table_id))?;
        let before = table.fields.len();
        table.fields.retain(|f| f.id != field_id);
        if table.fields.len() == before {
            return Err(Error::UnknownField {
                table: table_id,
                field: field_id,
            });
        }
        self.emit(DomainEvent::RemoveField { table_id, field_id });
        Ok(())
    }

    /// Apply a structural edit to a table
    pub fn update_table(&mut self, table_id: TableId, patch: TablePatch) -> Result<()> {
        let table = self
            .diagram
            .table_mut(table_id)
            .ok_or(Error::UnknownTable(table_id))?;
        let mut applied = TablePatch::new();
        if let Some(name) = patch.name {
            table.name = name.clone();
            applied.name = Some(name);
        }
        if let Some(width) = patch.width {
            let width = sanitize(width, table.width.unwrap_or(crate::MIN_TABLE_WIDTH));
            table.width = Some(width);
            applied.width = Some(width);
        }
        if let Some(position) = patch.position {
            let position = position.sanitized_or(table.position);
            table.position = position;
            applied.position = Some(position);
        }
        if !applied.is_empty() {
            self.emit(DomainEvent::UpdateTable {
                table_id,
                patch: applied,
            });
        }
        Ok(())
    }

    /// Apply a batched interaction patch, silently
    ///
    /// Unknown ids are stale leftovers of removed tables; they are skipped.
    pub fn update_tables_state(&mut self, updates: Vec<TableStateUpdate>) {
        for update in updates {
            let Some(table) = self.diagram.table_mut(update.table_id) else {
                tracing::debug!(table = %update.table_id, "skipping state update for unknown table");
                continue;
            };
            if let Some(position) = update.position {
                table.position = position.sanitized_or(table.position);
            }
            if let Some(width) = update.width {
                table.width = Some(sanitize(width, table.width.unwrap_or(crate::MIN_TABLE_WIDTH)));
            }
        }
    }

    /// Apply a position/size patch to an area, silently
    pub fn update_area(&mut self, area_id: AreaId, patch: AreaPatch) -> Result<()> {
        let area = self
            .diagram
            .area_mut(area_id)
            .ok_or(Error::UnknownArea(area_id))?;
        if let Some(position) = patch.position {
            area.position = position.sanitized_or(area.position);
        }
        if let Some(size) = patch.size {
            area.size = size.sanitized_or(area.size);
        }
        Ok(())
    }

    /// Add an area, silently
    pub fn add_area(&mut self, area: Area) {
        self.diagram.areas.push(area);
        self.bump_next_id();
    }

    /// Remove an area, silently
    pub fn remove_area(&mut self, area_id: AreaId) {
        self.diagram.areas.retain(|a| a.id != area_id);
    }

    /// Create a relationship from a connect gesture
    ///
    /// Endpoint existence is validated here; type compatibility is the
    /// caller's policy (it depends on the dialect and is a user-facing
    /// notice, not an error).
    pub fn create_relationship(&mut self, draft: RelationshipDraft) -> Result<RelationshipId> {
        self.require_field(draft.source_table_id, draft.source_field_id)?;
        self.require_field(draft.target_table_id, draft.target_field_id)?;
        let id = RelationshipId::new(self.alloc_id());
        self.diagram.relationships.push(Relationship {
            id,
            source_table_id: draft.source_table_id,
            source_field_id: draft.source_field_id,
            target_table_id: draft.target_table_id,
            target_field_id: draft.target_field_id,
        });
        Ok(id)
    }

    /// Remove relationships by id, silently
    pub fn remove_relationships(&mut self, ids: &[RelationshipId]) {
        self.diagram.relationships.retain(|r| !ids.contains(&r.id));
    }

    /// Create a dependency between two tables
    pub fn create_dependency(
        &mut self,
        table_id: TableId,
        dependent_table_id: TableId,
    ) -> Result<DependencyId> {
        self.require_table(table_id)?;
        self.require_table(dependent_table_id)?;
        let id = DependencyId::new(self.alloc_id());
        self.diagram.dependencies.push(Dependency {
            id,
            table_id,
            dependent_table_id,
        });
        Ok(id)
    }

    /// Remove dependencies by id, silently
    pub fn remove_dependencies(&mut self, ids: &[DependencyId]) {
        self.diagram.dependencies.retain(|d| !ids.contains(&d.id));
    }

    fn require_table(&self, id: TableId) -> Result<()> {
        self.diagram
            .table(id)
            .map(|_| ())
            .ok_or(Error::UnknownTable(id))
    }

    fn require_field(&self, table_id: TableId, field_id: FieldId) -> Result<()> {
        self.require_table(table_id)?;
        self.diagram
            .field(table_id, field_id)
            .map(|_| ())
            .ok_or(Error::UnknownField {
                table: table_id,
                field: field_id,
            })
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn bump_next_id(&mut self) {
        self.next_id = self.next_id.max(next_free_id(&self.diagram));
    }
}

/// Smallest id strictly above every id used in the diagram
fn next_free_id(diagram: &Diagram) -> u64 {
    let mut max = 0;
    for table in &diagram.tables {
        max = max.max(table.id.raw());
        for field in &table.fields {
            max = max.max(field.id.raw());
        }
    }
    for area in &diagram.areas {
        max = max.max(area.id.raw());
    }
    for rel in &diagram.relationships {
        max = max.max(rel.id.raw());
    }
    for dep in &diagram.dependencies {
        max = max.max(dep.id.raw());
    }
    max + 1
}
