//! Domain events emitted by the store
//!
//! Payloads are self-contained: a consumer applies each event fully before
//! the next without consulting the post-mutation diagram, so a sequence of
//! events observed out of a drained outbox replays exactly.

use crate::{Diagram, Field, FieldId, Table, TableId, TablePatch};
use serde::{Deserialize, Serialize};

/// A change to the authoritative diagram, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// Tables were added to the diagram
    AddTables { tables: Vec<Table> },
    /// Tables were removed (referencing relationships and dependencies
    /// are removed with them)
    RemoveTables { table_ids: Vec<TableId> },
    /// A field was appended to a table
    AddField { table_id: TableId, field: Field },
    /// A field was removed from a table
    RemoveField {
        table_id: TableId,
        field_id: FieldId,
    },
    /// Table attributes changed through the structural edit surface
    UpdateTable {
        table_id: TableId,
        patch: TablePatch,
    },
    /// A whole diagram replaced the current one
    LoadDiagram { diagram: Diagram },
}

impl DomainEvent {
    /// Short name for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            DomainEvent::AddTables { .. } => "add_tables",
            DomainEvent::RemoveTables { .. } => "remove_tables",
            DomainEvent::AddField { .. } => "add_field",
            DomainEvent::RemoveField { .. } => "remove_field",
            DomainEvent::UpdateTable { .. } => "update_table",
            DomainEvent::LoadDiagram { .. } => "load_diagram",
        }
    }
}
