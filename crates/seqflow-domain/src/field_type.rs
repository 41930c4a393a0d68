//! Lenguaje de tipos de los campos de entrada de un workflow.
//!
//! Cada `WorkflowVersion` declara sus campos con un descriptor de tipo
//! recursivo (estilo CWL):
//! - un nombre atómico (`"string"`, `"int"`, `"File"`, o un tipo de registro
//!   del dominio),
//! - `{ "type": "array", "items": <descriptor> }`,
//! - o una lista de alternativas (en la práctica sólo para expresar
//!   nullabilidad: `["null", T]`).
//!
//! El parseo es estructural; la validación de nombres atómicos desconocidos
//! ocurre al interpretar el tipo (síntesis de placeholders), no aquí.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::DomainError;

/// Descriptor de tipo recursivo de un campo de entrada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Nombre atómico (`string`, `int`, `File`, tipos de registro, `null`).
    Atomic(String),
    /// Secuencia homogénea de `items`.
    Array(Box<FieldType>),
    /// Lista ordenada de alternativas. El intérprete sólo acepta la forma
    /// nullable (`null` más otro miembro); cualquier otra unión es un error
    /// de integridad de datos.
    Union(Vec<FieldType>),
}

impl FieldType {
    /// Parsea el descriptor desde su forma JSON.
    pub fn from_value(value: &Value) -> Result<Self, DomainError> {
        match value {
            Value::String(name) => Ok(FieldType::Atomic(name.clone())),
            Value::Array(items) => {
                let members = items.iter().map(FieldType::from_value).collect::<Result<Vec<_>, _>>()?;
                if members.is_empty() {
                    return Err(DomainError::InvalidFieldType("empty union".to_string()));
                }
                Ok(FieldType::Union(members))
            }
            Value::Object(map) => {
                match map.get("type").and_then(Value::as_str) {
                    Some("array") => {
                        let items = map.get("items")
                                       .ok_or_else(|| DomainError::InvalidFieldType("array without items".to_string()))?;
                        Ok(FieldType::Array(Box::new(FieldType::from_value(items)?)))
                    }
                    _ => Err(DomainError::InvalidFieldType(value.to_string())),
                }
            }
            other => Err(DomainError::InvalidFieldType(other.to_string())),
        }
    }

    /// Forma JSON canónica del descriptor.
    pub fn to_value(&self) -> Value {
        match self {
            FieldType::Atomic(name) => Value::String(name.clone()),
            FieldType::Array(items) => serde_json::json!({"type": "array", "items": items.to_value()}),
            FieldType::Union(members) => Value::Array(members.iter().map(FieldType::to_value).collect()),
        }
    }

    /// Si la unión es exactamente `null` más otro miembro, devuelve ese
    /// miembro. Sólo aplica a `Union`.
    pub fn as_nullable(&self) -> Option<&FieldType> {
        match self {
            FieldType::Union(members) if members.len() == 2 => {
                let is_null = |t: &FieldType| matches!(t, FieldType::Atomic(n) if n == "null");
                match (is_null(&members[0]), is_null(&members[1])) {
                    (true, false) => Some(&members[1]),
                    (false, true) => Some(&members[0]),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        FieldType::from_value(&raw).map_err(|e| D::Error::custom(e.to_string()))
    }
}

/// Campo declarado por una versión de workflow: nombre + descriptor de tipo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_atomic_names() {
        let t = FieldType::from_value(&json!("int")).unwrap();
        assert_eq!(t, FieldType::Atomic("int".to_string()));
    }

    #[test]
    fn parses_nested_arrays() {
        let t = FieldType::from_value(&json!({"type": "array", "items": {"type": "array", "items": "File"}})).unwrap();
        assert_eq!(t,
                   FieldType::Array(Box::new(FieldType::Array(Box::new(FieldType::Atomic("File".to_string()))))));
    }

    #[test]
    fn nullable_union_exposes_inner_member() {
        let t = FieldType::from_value(&json!(["null", "int"])).unwrap();
        assert_eq!(t.as_nullable(), Some(&FieldType::Atomic("int".to_string())));

        let t = FieldType::from_value(&json!(["string", "null"])).unwrap();
        assert_eq!(t.as_nullable(), Some(&FieldType::Atomic("string".to_string())));
    }

    #[test]
    fn non_nullable_union_is_not_nullable() {
        let t = FieldType::from_value(&json!(["int", "string"])).unwrap();
        assert_eq!(t.as_nullable(), None);
    }

    #[test]
    fn rejects_malformed_descriptors() {
        assert!(FieldType::from_value(&json!(42)).is_err());
        assert!(FieldType::from_value(&json!({"type": "record"})).is_err());
        assert!(FieldType::from_value(&json!({"type": "array"})).is_err());
        assert!(FieldType::from_value(&json!([])).is_err());
    }

    #[test]
    fn field_descriptor_serde_uses_type_key() {
        let f: FieldDescriptor = serde_json::from_value(json!({"name": "threads", "type": "int"})).unwrap();
        assert_eq!(f.name, "threads");
        assert_eq!(f.field_type, FieldType::Atomic("int".to_string()));
        assert_eq!(serde_json::to_value(&f).unwrap(), json!({"name": "threads", "type": "int"}));
    }
}
