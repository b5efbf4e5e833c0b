//! Merging of override fragments onto base tables.

use std::collections::HashSet;

use tracing::debug;

use crate::schema::{Fragment, MergedSchema, TableSchema};

/// Combine base tables and fragments into one schema per table name.
///
/// A fragment for a known table upserts its columns and indices by name:
/// a replaced column keeps its position, new entries are appended, and
/// anything the fragment omits is inherited. A fragment for an unknown table
/// defines that table on its own. Tables keep the order in which their names
/// were first seen, base tables first.
pub fn merge(base_schemas: &[TableSchema], fragments: &[Fragment]) -> MergedSchema {
    let mut merged = MergedSchema::new();

    for table in base_schemas {
        match merged.get_mut(&table.name) {
            Some(existing) => apply(existing, &Fragment::from(table.clone())),
            None => merged.insert(table.clone()),
        }
    }

    for fragment in fragments {
        match merged.get_mut(&fragment.table) {
            Some(existing) => apply(existing, fragment),
            None => {
                debug!(table = %fragment.table, "fragment defines new table");
                merged.insert(fragment.clone().into_table());
            }
        }
    }

    merged
}

fn apply(table: &mut TableSchema, fragment: &Fragment) {
    if let Some(columns) = &fragment.columns {
        let mut seen = HashSet::new();
        for column in columns {
            if !seen.insert(column.name.as_str()) {
                debug!(
                    table = %table.name,
                    column = %column.name,
                    "fragment repeats column, last definition wins"
                );
            }
            table.upsert_column(column.clone());
        }
    }
    if let Some(indices) = &fragment.indices {
        let mut seen = HashSet::new();
        for index in indices {
            if !seen.insert(index.name.as_str()) {
                debug!(
                    table = %table.name,
                    index = %index.name,
                    "fragment repeats index, last definition wins"
                );
            }
            table.upsert_index(index.clone());
        }
    }
    debug!(
        table = %table.name,
        columns = table.columns.len(),
        indices = table.indices.len(),
        "merged fragment into table"
    );
}
