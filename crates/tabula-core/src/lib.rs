//! Tabula Core - domain model for entity-relationship diagrams
//!
//! This crate provides the authoritative domain model of the editor:
//! - Identifier newtypes for tables, fields, areas, relationships, dependencies
//! - Geometry primitives with finite-value sanitization
//! - Schema types: field types, database dialects, schema visibility filter
//! - The `Diagram` aggregate and the single-writer `DiagramStore`
//! - The closed `DomainEvent` union consumed by the sync layer
//!
//! ## Design Principles
//!
//! 1. **tabula-core is standalone** - it does NOT know about tabula-sync
//! 2. **Events are self-contained** - payloads carry everything a consumer
//!    needs, so events apply strictly in emission order
//! 3. **Numerics are sanitized, never rejected** - positions are finite at
//!    every read boundary

mod diagram;
mod error;
mod event;
pub mod geometry;
mod identity;
mod schema;
mod store;

pub use diagram::{
    rendered_table_height, Area, Dependency, Diagram, Relationship, Table, FIELD_ROW_HEIGHT,
    MIN_TABLE_WIDTH, TABLE_HEADER_HEIGHT,
};
pub use error::{Error, Result};
pub use event::DomainEvent;
pub use identity::{AreaId, DependencyId, FieldId, RelationshipId, TableId};
pub use schema::{DatabaseKind, Field, FieldType, SchemaFilter};
pub use store::{AreaPatch, DiagramStore, RelationshipDraft, TablePatch, TableStateUpdate};
