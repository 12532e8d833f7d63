//! The diagram aggregate: tables, areas, relationships, dependencies

use crate::geometry::{Point, Size};
use crate::{AreaId, DatabaseKind, DependencyId, Field, FieldId, RelationshipId, TableId};
use serde::{Deserialize, Serialize};

/// Default width of a table node before the user resizes it
pub const MIN_TABLE_WIDTH: f64 = 224.0;

/// Height of the table header strip
pub const TABLE_HEADER_HEIGHT: f64 = 42.0;

/// Height of one rendered field row
pub const FIELD_ROW_HEIGHT: f64 = 32.0;

/// Padding under the last field row
const TABLE_BOTTOM_PADDING: f64 = 8.0;

/// Rendered height of a table with the given number of fields
pub fn rendered_table_height(field_count: usize) -> f64 {
    TABLE_HEADER_HEIGHT + field_count as f64 * FIELD_ROW_HEIGHT + TABLE_BOTTOM_PADDING
}

/// A database table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    /// Schema the table belongs to, if the dialect has schemas
    pub schema: Option<String>,
    /// Top-left position on the canvas
    pub position: Point,
    /// Explicit width, present once the user has resized the table
    pub width: Option<f64>,
    /// Ordered field list
    pub fields: Vec<Field>,
}

impl Table {
    /// Create a table at the origin with no fields
    pub fn new(id: impl Into<TableId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schema: None,
            position: Point::default(),
            width: None,
            fields: Vec::new(),
        }
    }

    /// Set the canvas position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    /// Set the schema name
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set an explicit width
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Append a field
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by id
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// A freeform grouping area, always drawn behind tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub position: Point,
    pub size: Size,
}

impl Area {
    /// Create an area at the origin with zero size
    pub fn new(id: impl Into<AreaId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: Point::default(),
            size: Size::default(),
        }
    }

    /// Set the canvas position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    /// Set the size
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }
}

/// A foreign-key relationship between two fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub source_table_id: TableId,
    pub source_field_id: FieldId,
    pub target_table_id: TableId,
    pub target_field_id: FieldId,
}

/// A table-level dependency (e.g. a view on its source table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: DependencyId,
    /// The depended-on table
    pub table_id: TableId,
    /// The table that depends on it
    pub dependent_table_id: TableId,
}

/// The full diagram aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub database: DatabaseKind,
    pub tables: Vec<Table>,
    pub areas: Vec<Area>,
    pub relationships: Vec<Relationship>,
    pub dependencies: Vec<Dependency>,
}

impl Diagram {
    /// Create an empty diagram for the given dialect
    pub fn new(database: DatabaseKind) -> Self {
        Self {
            database,
            ..Default::default()
        }
    }

    /// Look up a table by id
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Look up a table by id, mutably
    pub fn table_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.id == id)
    }

    /// Look up an area by id
    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    /// Look up an area by id, mutably
    pub fn area_mut(&mut self, id: AreaId) -> Option<&mut Area> {
        self.areas.iter_mut().find(|a| a.id == id)
    }

    /// Look up a field by table and field id
    pub fn field(&self, table_id: TableId, field_id: FieldId) -> Option<&Field> {
        self.table(table_id).and_then(|t| t.field(field_id))
    }

    /// Look up a relationship by id
    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }
}
