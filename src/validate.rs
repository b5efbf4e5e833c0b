//! Consistency checks over merged tables.
//!
//! Validation never stops at the first problem: every finding is returned so
//! a whole batch of schema edits can be corrected in one pass.

use std::collections::{HashMap, HashSet};

use crate::schema::{IndexType, MergedSchema, TableSchema};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("table {table}: column {column} is defined {count} times")]
    DuplicateColumn {
        table: String,
        column: String,
        count: usize,
    },
    #[error("table {table}: index {index} is defined {count} times")]
    DuplicateIndex {
        table: String,
        index: String,
        count: usize,
    },
    #[error("table {table}: index {index} references unknown column {column}")]
    UnknownIndexColumn {
        table: String,
        index: String,
        column: String,
    },
    #[error("table {table}: more than one PRIMARY index ({})", .indices.join(", "))]
    MultiplePrimaryKeys { table: String, indices: Vec<String> },
    #[error("table {table}: column {column} of PRIMARY index {index} is nullable")]
    NullablePrimaryKeyColumn {
        table: String,
        index: String,
        column: String,
    },
    #[error("table {table}: default {value} of column {column} does not fit type {typ}")]
    IncompatibleDefault {
        table: String,
        column: String,
        typ: String,
        value: String,
    },
}

impl ValidationError {
    pub fn table(&self) -> &str {
        match self {
            Self::DuplicateColumn { table, .. }
            | Self::DuplicateIndex { table, .. }
            | Self::UnknownIndexColumn { table, .. }
            | Self::MultiplePrimaryKeys { table, .. }
            | Self::NullablePrimaryKeyColumn { table, .. }
            | Self::IncompatibleDefault { table, .. } => table,
        }
    }
}

/// Check every table and return all findings, grouped by table.
pub fn validate(merged: &MergedSchema) -> Vec<ValidationError> {
    merged.iter().flat_map(validate_table).collect()
}

pub fn validate_table(table: &TableSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (column, count) in duplicates(table.columns.iter().map(|c| c.name.as_str())) {
        errors.push(ValidationError::DuplicateColumn {
            table: table.name.clone(),
            column: column.to_string(),
            count,
        });
    }

    for (index, count) in duplicates(table.indices.iter().map(|i| i.name.as_str())) {
        errors.push(ValidationError::DuplicateIndex {
            table: table.name.clone(),
            index: index.to_string(),
            count,
        });
    }

    let known: HashSet<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    for index in &table.indices {
        let mut reported = HashSet::new();
        for column in &index.columns {
            if !known.contains(column.as_str()) && reported.insert(column.as_str()) {
                errors.push(ValidationError::UnknownIndexColumn {
                    table: table.name.clone(),
                    index: index.name.clone(),
                    column: column.clone(),
                });
            }
        }
    }

    let primaries: Vec<_> = table
        .indices
        .iter()
        .filter(|i| i.typ == IndexType::Primary)
        .collect();
    if primaries.len() > 1 {
        errors.push(ValidationError::MultiplePrimaryKeys {
            table: table.name.clone(),
            indices: primaries.iter().map(|i| i.name.clone()).collect(),
        });
    }

    // A nullable column shared by several PRIMARY indices is reported once.
    let mut nullable_reported = HashSet::new();
    for index in &primaries {
        for name in &index.columns {
            let Some(column) = table.column(name) else {
                continue;
            };
            if column.nullable && nullable_reported.insert(name.as_str()) {
                errors.push(ValidationError::NullablePrimaryKeyColumn {
                    table: table.name.clone(),
                    index: index.name.clone(),
                    column: name.clone(),
                });
            }
        }
    }

    for column in &table.columns {
        if let Some(value) = &column.default {
            if !column.typ.accepts(value) {
                errors.push(ValidationError::IncompatibleDefault {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    typ: column.typ.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    errors
}

/// Names seen more than once, in order of first appearance.
fn duplicates<'a>(names: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut order = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            order.push(name);
        }
        *count += 1;
    }
    order
        .into_iter()
        .filter_map(|name| {
            let count = counts[name];
            (count > 1).then_some((name, count))
        })
        .collect()
}
