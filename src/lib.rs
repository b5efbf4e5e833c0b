pub mod assembly;
pub mod config;
pub mod loader;
pub mod merge;
pub mod pipeline;
pub mod schema;
pub mod serializer;
pub mod validate;

use wasm_bindgen::prelude::*;

use loader::{ParseError, Source, load_fragments};
use merge::merge;
use schema::{Fragment, MergedSchema};
use validate::validate;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Load base and fragment documents and merge them.
pub fn load_and_merge(
    base: &[Source],
    fragments: &[Source],
) -> Result<MergedSchema, ParseError> {
    let base_tables: Vec<_> = load_fragments(base)?
        .into_iter()
        .map(Fragment::into_table)
        .collect();
    let fragments = load_fragments(fragments)?;
    Ok(merge(&base_tables, &fragments))
}

fn merge_documents(base: &str, fragments: &str) -> Result<MergedSchema, String> {
    load_and_merge(&[Source::new("base", base)], &[Source::new("fragments", fragments)])
        .map_err(|e| e.to_string())
}

/// Merge fragment documents onto base documents and return the merged YAML
#[wasm_bindgen(js_name = "mergeSchema")]
pub fn merge_schema(base: &str, fragments: &str) -> Result<String, String> {
    let merged = merge_documents(base, fragments)?;
    serializer::to_yaml(&merged).map_err(|e| e.to_string())
}

/// Merge and return every validation finding as a message.
pub fn validation_messages(base: &str, fragments: &str) -> Result<Vec<String>, String> {
    let merged = merge_documents(base, fragments)?;
    Ok(validate(&merged).iter().map(ToString::to_string).collect())
}

/// Merge and return every validation finding as a message
#[wasm_bindgen(js_name = "validateSchema")]
pub fn validate_schema(base: &str, fragments: &str) -> Result<js_sys::Array, String> {
    Ok(validation_messages(base, fragments)?
        .iter()
        .map(|m| JsValue::from_str(m))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRA: &str = include_str!("../data/apdb-schema-extra.yaml");

    #[test]
    fn test_load_and_merge_against_base() {
        let base = Source::new(
            "base.yaml",
            "table: DiaObject\ncolumns:\n- name: diaObjectId\n  type: BIGINT\n  nullable: false\n",
        );
        let merged = load_and_merge(&[base], &[Source::new("extra.yaml", EXTRA)]).unwrap();

        assert_eq!(
            merged.table_names(),
            vec!["DiaObject", "DiaObjectLast", "DiaObjectIndexHtmFirst"]
        );
        assert_eq!(merged.get("DiaObject").unwrap().columns.len(), 4);
    }

    #[test]
    fn test_merge_schema_yaml() {
        let yaml = merge_schema("", EXTRA).unwrap();
        assert!(yaml.contains("table: DiaObjectLast"));
        assert!(yaml.contains("name: PK_DiaObjectLast"));
    }

    #[test]
    fn test_validation_messages() {
        let base = "table: T\ncolumns:\n- name: a\n  type: INT\n  nullable: false\n";
        let fragments = "table: T\nindices:\n- name: PK_T\n  columns: [a, b]\n  type: PRIMARY\n";
        let messages = validation_messages(base, fragments).unwrap();
        assert_eq!(
            messages,
            vec!["table T: index PK_T references unknown column b".to_string()]
        );

        assert!(validation_messages(base, "").unwrap().is_empty());
        assert!(validation_messages("", "columns: []\n").is_err());
    }

    #[test]
    fn test_merge_schema_reports_parse_error() {
        let err = merge_schema("", "columns: []\n").unwrap_err();
        assert!(err.contains("no `table` key"));
    }
}
