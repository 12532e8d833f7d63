//! Schema-level types: fields, field types, dialects, visibility filter

use crate::FieldId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a field data type (e.g. "varchar", "int4")
///
/// String-based so dialect type catalogs can be extended without touching
/// this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldType(pub String);

impl FieldType {
    /// Create a new field type id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the type id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A column of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique identifier within the diagram
    pub id: FieldId,
    /// Column name
    pub name: String,
    /// Data type id
    pub field_type: FieldType,
    /// Whether this field is part of the primary key
    pub primary_key: bool,
    /// Whether the column accepts NULL
    pub nullable: bool,
}

impl Field {
    /// Create a new nullable, non-key field
    pub fn new(id: impl Into<FieldId>, name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type: ty.into(),
            primary_key: false,
            nullable: true,
        }
    }

    /// Mark the field as primary key (and not nullable)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }
}

/// Supported database dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DatabaseKind {
    /// Dialect-agnostic diagram
    #[default]
    Generic,
    /// MySQL / MariaDB
    MySql,
    /// PostgreSQL
    Postgres,
    /// SQLite
    Sqlite,
    /// Microsoft SQL Server
    SqlServer,
    /// ClickHouse
    ClickHouse,
}

impl DatabaseKind {
    /// Whether a relationship between two field types is allowed
    ///
    /// Base rule: identical type ids. Dialects with interchangeable type
    /// aliases additionally accept pairs within the same alias group.
    pub fn types_compatible(&self, a: &FieldType, b: &FieldType) -> bool {
        if a == b {
            return true;
        }
        match (self.alias_group(a), self.alias_group(b)) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => false,
        }
    }

    /// Alias group a type id belongs to, if the dialect defines one
    fn alias_group(&self, ty: &FieldType) -> Option<&'static str> {
        match self {
            DatabaseKind::Postgres => match ty.as_str() {
                "int2" | "smallint" | "smallserial" => Some("int2"),
                "int4" | "int" | "integer" | "serial" => Some("int4"),
                "int8" | "bigint" | "bigserial" => Some("int8"),
                "varchar" | "character varying" | "text" => Some("text"),
                _ => None,
            },
            DatabaseKind::MySql => match ty.as_str() {
                "int" | "integer" => Some("int"),
                "bool" | "boolean" | "tinyint" => Some("bool"),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether dependency edges are always shown for this dialect
    ///
    /// ClickHouse materialized views make table dependencies a first-class
    /// part of the schema, so they stay visible regardless of the
    /// show-dependencies preference.
    pub fn always_shows_dependencies(&self) -> bool {
        matches!(self, DatabaseKind::ClickHouse)
    }
}

/// Which schemas are currently visible
///
/// `None` shows every schema. Tables without a schema are always visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SchemaFilter {
    visible: Option<IndexSet<String>>,
}

impl SchemaFilter {
    /// Show all schemas
    pub fn all() -> Self {
        Self::default()
    }

    /// Show only the given schemas
    pub fn only<I, S>(schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            visible: Some(schemas.into_iter().map(Into::into).collect()),
        }
    }

    /// Whether a table with the given schema name is visible
    pub fn shows(&self, schema: Option<&str>) -> bool {
        match (&self.visible, schema) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(set), Some(name)) => set.contains(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_type_compatible() {
        let db = DatabaseKind::Generic;
        assert!(db.types_compatible(&"varchar".into(), &"varchar".into()));
        assert!(!db.types_compatible(&"varchar".into(), &"int4".into()));
    }

    #[test]
    fn test_postgres_aliases_compatible() {
        let db = DatabaseKind::Postgres;
        assert!(db.types_compatible(&"int4".into(), &"serial".into()));
        assert!(db.types_compatible(&"bigint".into(), &"int8".into()));
        assert!(!db.types_compatible(&"int4".into(), &"int8".into()));
        // alias groups are dialect-specific
        assert!(!DatabaseKind::Generic.types_compatible(&"int4".into(), &"serial".into()));
    }

    #[test]
    fn test_dependency_visibility_policy() {
        assert!(DatabaseKind::ClickHouse.always_shows_dependencies());
        assert!(!DatabaseKind::Postgres.always_shows_dependencies());
    }

    #[test]
    fn test_schema_filter() {
        let all = SchemaFilter::all();
        assert!(all.shows(Some("public")));
        assert!(all.shows(None));

        let filtered = SchemaFilter::only(["public"]);
        assert!(filtered.shows(Some("public")));
        assert!(!filtered.shows(Some("audit")));
        // tables without a schema are always visible
        assert!(filtered.shows(None));
    }
}
