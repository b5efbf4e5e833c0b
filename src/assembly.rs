//! Assembly of the physical table set from merged logical tables.

use tracing::{debug, warn};

use crate::config::{DiaObjectIndex, SchemaConfig};
use crate::schema::{ColumnDef, ColumnType, IndexDef, IndexType, MergedSchema, TableSchema};

pub const DIA_OBJECT: &str = "DiaObject";
pub const DIA_OBJECT_NIGHTLY: &str = "DiaObjectNightly";
pub const DIA_OBJECT_LAST: &str = "DiaObjectLast";
pub const DIA_OBJECT_INDEX_HTM_FIRST: &str = "DiaObjectIndexHtmFirst";
pub const PROTO_VISITS: &str = "PpdbProtoVisits";

/// Tables copied as defined, when present.
pub const PLAIN_TABLES: [&str; 4] = [
    "DiaSource",
    "SSObject",
    "DiaForcedSource",
    "DiaObject_To_Object_Match",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("table {table} is required by the {mode} configuration but is not defined")]
    MissingTable { table: String, mode: &'static str },
}

/// Build the physical tables described by `config`, with the configured
/// prefix applied to every table and index name.
pub fn assemble(
    merged: &MergedSchema,
    config: &SchemaConfig,
) -> Result<MergedSchema, AssemblyError> {
    let prefix = config.prefix.as_str();
    let mode = mode_name(config.dia_object_index);
    let require = |name: &str| {
        merged.get(name).ok_or_else(|| AssemblyError::MissingTable {
            table: name.to_string(),
            mode,
        })
    };

    let mut tables = MergedSchema::new();

    let dia_object = require(DIA_OBJECT)?;
    let dia_object_indices = match config.dia_object_index {
        // HTM column first in the primary key
        DiaObjectIndex::PixIdIov => &require(DIA_OBJECT_INDEX_HTM_FIRST)?.indices,
        _ => &dia_object.indices,
    };
    tables.insert(physical(prefix, DIA_OBJECT, &dia_object.columns, dia_object_indices));

    if config.dia_object_nightly {
        tables.insert(physical(prefix, DIA_OBJECT_NIGHTLY, &dia_object.columns, &[]));
    }

    if config.dia_object_index == DiaObjectIndex::LastObjectTable {
        let last = require(DIA_OBJECT_LAST)?;
        tables.insert(physical(prefix, DIA_OBJECT_LAST, &last.columns, &last.indices));
    }

    for name in PLAIN_TABLES {
        match merged.get(name) {
            Some(table) => tables.insert(physical(prefix, name, &table.columns, &table.indices)),
            None => warn!(table = name, "table not defined, skipping"),
        }
    }

    tables.insert(proto_visits(prefix));

    debug!(tables = ?tables.table_names(), mode, "assembled physical schema");
    Ok(tables)
}

fn mode_name(mode: DiaObjectIndex) -> &'static str {
    match mode {
        DiaObjectIndex::Baseline => "baseline",
        DiaObjectIndex::PixIdIov => "pix_id_iov",
        DiaObjectIndex::LastObjectTable => "last_object_table",
    }
}

fn physical(prefix: &str, name: &str, columns: &[ColumnDef], indices: &[IndexDef]) -> TableSchema {
    TableSchema {
        name: format!("{}{}", prefix, name),
        columns: columns.to_vec(),
        indices: indices
            .iter()
            .map(|index| IndexDef {
                name: format!("{}{}", prefix, index.name),
                ..index.clone()
            })
            .collect(),
    }
}

/// Visit bookkeeping table used by the prototype.
fn proto_visits(prefix: &str) -> TableSchema {
    let columns = [
        ColumnDef::new("visitId", ColumnType::Bigint, false),
        ColumnDef::new("visitTime", ColumnType::Datetime, false),
    ];
    let indices = [
        IndexDef::new("PK_PpdbProtoVisits", ["visitId"], IndexType::Primary),
        IndexDef::new("IDX_PpdbProtoVisits_vTime", ["visitTime"], IndexType::Index),
    ];
    physical(prefix, PROTO_VISITS, &columns, &indices)
}
