//! Table schema value records.

mod types;

pub use types::{ColumnType, DefaultValue, IndexType};

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub typ: ColumnType,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
    pub description: Option<String>,
    pub ucd: Option<String>,
    pub unit: Option<String>,
}

impl ColumnDef {
    /// Column with no default and no metadata.
    pub fn new(name: impl Into<String>, typ: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            typ,
            nullable,
            default: None,
            description: None,
            ucd: None,
            unit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDef {
    pub name: String,
    /// Order defines index column order.
    pub columns: Vec<String>,
    pub typ: IndexType,
}

impl IndexDef {
    pub fn new<I, S>(name: impl Into<String>, columns: I, typ: IndexType) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            typ,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub indices: Vec<IndexDef>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&IndexDef> {
        self.indices.iter().find(|i| i.name == name)
    }

    /// The first PRIMARY index, if any.
    pub fn primary_key(&self) -> Option<&IndexDef> {
        self.indices.iter().find(|i| i.typ == IndexType::Primary)
    }

    /// Replace the column with the same name in place, or append.
    pub fn upsert_column(&mut self, column: ColumnDef) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// Replace the index with the same name in place, or append.
    pub fn upsert_index(&mut self, index: IndexDef) {
        match self.indices.iter_mut().find(|i| i.name == index.name) {
            Some(existing) => *existing = index,
            None => self.indices.push(index),
        }
    }
}

/// One `table:` block of a fragment document. Absent lists inherit from the
/// base table.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub table: String,
    pub columns: Option<Vec<ColumnDef>>,
    pub indices: Option<Vec<IndexDef>>,
}

impl Fragment {
    /// Use this block as a complete table definition.
    pub fn into_table(self) -> TableSchema {
        TableSchema {
            name: self.table,
            columns: self.columns.unwrap_or_default(),
            indices: self.indices.unwrap_or_default(),
        }
    }
}

impl From<TableSchema> for Fragment {
    fn from(table: TableSchema) -> Self {
        Self {
            table: table.name,
            columns: Some(table.columns),
            indices: Some(table.indices),
        }
    }
}

/// Tables keyed by name, kept in first-encountered order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSchema {
    tables: Vec<TableSchema>,
    positions: HashMap<String, usize>,
}

impl MergedSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.positions.get(name).map(|&i| &self.tables[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TableSchema> {
        self.positions.get(name).map(|&i| &mut self.tables[i])
    }

    /// Insert a table, replacing any table with the same name in place.
    pub fn insert(&mut self, table: TableSchema) {
        match self.positions.get(&table.name) {
            Some(&i) => self.tables[i] = table,
            None => {
                self.positions.insert(table.name.clone(), self.tables.len());
                self.tables.push(table);
            }
        }
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TableSchema> {
        self.tables.iter()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<TableSchema> for MergedSchema {
    fn from_iter<I: IntoIterator<Item = TableSchema>>(iter: I) -> Self {
        let mut merged = Self::new();
        for table in iter {
            merged.insert(table);
        }
        merged
    }
}

impl<'a> IntoIterator for &'a MergedSchema {
    type Item = &'a TableSchema;
    type IntoIter = std::slice::Iter<'a, TableSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableSchema {
        TableSchema {
            name: "DiaObject".to_string(),
            columns: vec![
                ColumnDef::new("diaObjectId", ColumnType::Bigint, false),
                ColumnDef::new("ra", ColumnType::Double, false),
            ],
            indices: vec![IndexDef::new("PK_DiaObject", ["diaObjectId"], IndexType::Primary)],
        }
    }

    #[test]
    fn test_upsert_column_keeps_position() {
        let mut t = table();
        t.upsert_column(ColumnDef::new("diaObjectId", ColumnType::Bigint, true));
        assert_eq!(t.columns.len(), 2);
        assert_eq!(t.columns[0].name, "diaObjectId");
        assert!(t.columns[0].nullable);
    }

    #[test]
    fn test_upsert_column_appends_new() {
        let mut t = table();
        t.upsert_column(ColumnDef::new("nDiaSources", ColumnType::Int, false));
        assert_eq!(t.columns.last().unwrap().name, "nDiaSources");
    }

    #[test]
    fn test_primary_key_lookup() {
        let t = table();
        assert_eq!(t.primary_key().unwrap().columns, vec!["diaObjectId"]);
        assert!(t.column("ra").is_some());
        assert!(t.index("missing").is_none());
    }

    #[test]
    fn test_merged_schema_insert_replaces_in_place() {
        let mut merged: MergedSchema =
            vec![TableSchema::new("A"), TableSchema::new("B")].into_iter().collect();
        let mut replacement = TableSchema::new("A");
        replacement.columns.push(ColumnDef::new("x", ColumnType::Int, true));
        merged.insert(replacement);

        assert_eq!(merged.table_names(), vec!["A", "B"]);
        assert_eq!(merged.get("A").unwrap().columns.len(), 1);
    }

    #[test]
    fn test_fragment_into_table_defaults_empty() {
        let fragment = Fragment {
            table: "DiaObjectIndexHtmFirst".to_string(),
            columns: None,
            indices: None,
        };
        let t = fragment.into_table();
        assert!(t.columns.is_empty());
        assert!(t.indices.is_empty());
    }
}
