//! Síntesis de placeholders a partir de descriptores de tipo.
//!
//! El intérprete es puro: el mismo descriptor produce siempre el mismo
//! placeholder. El registro de tipos atómicos es cerrado; un nombre fuera
//! del registro es un error de integridad de datos (`UnknownType`).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use seqflow_domain::FieldType;

use crate::errors::CoreError;

/// Constantes de placeholder (bit-exactas, forman parte del contrato wire).
pub const STRING_VALUE_PLACEHOLDER: &str = "<String Value>";
pub const INT_VALUE_PLACEHOLDER: &str = "<Integer Value>";
pub const FILE_PLACEHOLDER_URL: &str = "dds://<Project Name>/<File Path>";

/// Nodo `{class: File, path: <placeholder>}`.
pub fn file_placeholder() -> Value {
    json!({"class": "File", "path": FILE_PLACEHOLDER_URL})
}

// Plantillas registradas de los tipos de registro del dominio. Sus hojas ya
// contienen los tres placeholders de arriba, así que el validador las
// detecta con el walker sin tratamiento especial.
static RECORD_TEMPLATES: Lazy<HashMap<&'static str, Value>> = Lazy::new(|| {
    let mut templates = HashMap::new();
    templates.insert("NamedFASTQFilePairType",
                     json!({
                         "name": STRING_VALUE_PLACEHOLDER,
                         "file1": {"class": "File", "path": FILE_PLACEHOLDER_URL},
                         "file2": {"class": "File", "path": FILE_PLACEHOLDER_URL},
                     }));
    templates.insert("FASTQReadPairType",
                     json!({
                         "name": STRING_VALUE_PLACEHOLDER,
                         "read1_files": [{"class": "File", "path": FILE_PLACEHOLDER_URL}],
                         "read2_files": [{"class": "File", "path": FILE_PLACEHOLDER_URL}],
                     }));
    templates
});

/// ¿Es el escalar uno de los placeholders de usuario?
pub fn is_placeholder_scalar(value: &Value) -> bool {
    match value.as_str() {
        Some(s) => s == STRING_VALUE_PLACEHOLDER || s == INT_VALUE_PLACEHOLDER || s == FILE_PLACEHOLDER_URL,
        None => false,
    }
}

/// Construye el placeholder del descriptor dado.
pub fn placeholder_for(field_type: &FieldType) -> Result<Value, CoreError> {
    match field_type {
        FieldType::Atomic(name) => match name.as_str() {
            "string" => Ok(Value::String(STRING_VALUE_PLACEHOLDER.to_string())),
            "int" => Ok(Value::String(INT_VALUE_PLACEHOLDER.to_string())),
            "File" => Ok(file_placeholder()),
            other => RECORD_TEMPLATES.get(other)
                                     .cloned()
                                     .ok_or_else(|| CoreError::UnknownType(other.to_string())),
        },
        FieldType::Array(items) => Ok(Value::Array(vec![placeholder_for(items)?])),
        FieldType::Union(_) => match field_type.as_nullable() {
            // `[null, T]` se presenta como campo opcional: el placeholder es null.
            Some(_) => Ok(Value::Null),
            None => Err(CoreError::UnknownType(field_type.to_value().to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqflow_domain::FieldType;
    use serde_json::json;

    fn parse(v: Value) -> FieldType {
        FieldType::from_value(&v).unwrap()
    }

    #[test]
    fn atomic_placeholders() {
        assert_eq!(placeholder_for(&parse(json!("string"))).unwrap(), json!("<String Value>"));
        assert_eq!(placeholder_for(&parse(json!("int"))).unwrap(), json!("<Integer Value>"));
        assert_eq!(placeholder_for(&parse(json!("File"))).unwrap(),
                   json!({"class": "File", "path": "dds://<Project Name>/<File Path>"}));
    }

    #[test]
    fn record_templates_embed_placeholders() {
        let v = placeholder_for(&parse(json!("NamedFASTQFilePairType"))).unwrap();
        assert_eq!(v["name"], json!("<String Value>"));
        assert_eq!(v["file1"]["path"], json!("dds://<Project Name>/<File Path>"));
        assert_eq!(v["file2"]["class"], json!("File"));

        let v = placeholder_for(&parse(json!("FASTQReadPairType"))).unwrap();
        assert_eq!(v["read1_files"][0]["path"], json!("dds://<Project Name>/<File Path>"));
        assert_eq!(v["read2_files"][0]["class"], json!("File"));
    }

    #[test]
    fn array_of_arrays_nests_exactly_once_per_level() {
        let t = parse(json!({"type": "array", "items": {"type": "array", "items": "File"}}));
        assert_eq!(placeholder_for(&t).unwrap(),
                   json!([[{"class": "File", "path": "dds://<Project Name>/<File Path>"}]]));
    }

    #[test]
    fn nullable_union_is_null() {
        assert_eq!(placeholder_for(&parse(json!(["null", "int"]))).unwrap(), Value::Null);
    }

    #[test]
    fn non_nullable_union_is_unknown_type() {
        let err = placeholder_for(&parse(json!(["int", "string"]))).unwrap_err();
        assert!(matches!(err, CoreError::UnknownType(_)));
    }

    #[test]
    fn unknown_atomic_is_unknown_type() {
        let err = placeholder_for(&parse(json!("BogusType"))).unwrap_err();
        assert!(matches!(err, CoreError::UnknownType(name) if name == "BogusType"));
    }

    #[test]
    fn interpreter_is_deterministic() {
        let t = parse(json!({"type": "array", "items": "NamedFASTQFilePairType"}));
        assert_eq!(placeholder_for(&t).unwrap(), placeholder_for(&t).unwrap());
    }
}
