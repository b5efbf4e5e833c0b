//! Serializer for writing merged tables back out as fragment documents.

use serde_yaml::{Number, Value};

use crate::loader::{RawBlock, RawColumn, RawIndex};
use crate::schema::{ColumnDef, DefaultValue, IndexDef, MergedSchema, TableSchema};

/// Serialize every table as one `table:` block, blocks separated by `---`.
pub fn to_yaml(schema: &MergedSchema) -> Result<String, serde_yaml::Error> {
    let mut output = String::new();

    for table in schema {
        output.push_str("---\n");
        output.push_str(&serde_yaml::to_string(&raw_table(table))?);
    }

    Ok(output)
}

fn raw_table(table: &TableSchema) -> RawBlock {
    RawBlock {
        table: Some(table.name.clone()),
        columns: (!table.columns.is_empty())
            .then(|| table.columns.iter().map(raw_column).collect()),
        indices: (!table.indices.is_empty())
            .then(|| table.indices.iter().map(raw_index).collect()),
    }
}

fn raw_column(column: &ColumnDef) -> RawColumn {
    RawColumn {
        name: Some(column.name.clone()),
        typ: Some(column.typ.as_str().to_string()),
        nullable: Some(column.nullable),
        default: column.default.as_ref().map(default_value),
        description: column.description.clone(),
        ucd: column.ucd.clone(),
        unit: column.unit.clone(),
    }
}

fn raw_index(index: &IndexDef) -> RawIndex {
    RawIndex {
        name: Some(index.name.clone()),
        columns: Some(index.columns.clone()),
        typ: Some(index.typ.as_str().to_string()),
    }
}

fn default_value(value: &DefaultValue) -> Value {
    match value {
        DefaultValue::Bool(b) => Value::Bool(*b),
        DefaultValue::Int(n) => Value::Number(Number::from(*n)),
        DefaultValue::Float(x) => Value::Number(Number::from(*x)),
        DefaultValue::Str(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;
    use crate::merge::merge;
    use crate::schema::{ColumnType, IndexType};

    #[test]
    fn test_serialize_simple_table() {
        let mut table = TableSchema::new("DiaObjectLast");
        let mut column = ColumnDef::new("pixelId", ColumnType::Bigint, false);
        column.description = Some("HTM index.".to_string());
        table.columns.push(column);
        table
            .indices
            .push(IndexDef::new("PK_DiaObjectLast", ["pixelId"], IndexType::Primary));
        let schema: MergedSchema = std::iter::once(table).collect();

        let result = to_yaml(&schema).unwrap();
        assert!(result.starts_with("---\ntable: DiaObjectLast\n"));
        assert!(result.contains("name: pixelId"));
        assert!(result.contains("type: BIGINT"));
        assert!(result.contains("nullable: false"));
        assert!(result.contains("type: PRIMARY"));
        assert!(!result.contains("ucd"));
    }

    #[test]
    fn test_serialize_index_only_table() {
        let mut table = TableSchema::new("DiaObjectIndexHtmFirst");
        table
            .indices
            .push(IndexDef::new("IDX_DiaObject_diaObjectId", ["diaObjectId"], IndexType::Index));
        let schema: MergedSchema = std::iter::once(table).collect();

        let result = to_yaml(&schema).unwrap();
        let reloaded = load_str(&result).unwrap();
        assert!(reloaded[0].columns.is_none());
        assert_eq!(reloaded[0].indices.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_output_reloads_to_same_schema() {
        let fragments = load_str(include_str!("../data/apdb-schema-extra.yaml")).unwrap();
        let merged = merge(&[], &fragments);

        let text = to_yaml(&merged).unwrap();
        let reloaded = merge(&[], &load_str(&text).unwrap());
        assert_eq!(merged, reloaded);
    }
}
