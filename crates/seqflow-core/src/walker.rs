//! Recorrido visitor sobre el árbol de un job order.
//!
//! Reglas de recorrido:
//! - La clave de nivel superior queda fija durante toda la recursión de su
//!   subárbol.
//! - Las secuencias recursan elemento a elemento conservando la clave.
//! - Un mapping con la entrada `class` dispara `on_class` y corta la
//!   recursión.
//! - Cualquier otro mapping recursa en sus valores.
//! - Los escalares disparan `on_simple`. Los strings nunca se tratan como
//!   secuencias.

use serde_json::{Map, Value};

/// Hooks del visitor.
pub trait JobOrderVisitor {
    fn on_simple(&mut self, top_level_key: &str, value: &Value);
    fn on_class(&mut self, top_level_key: &str, value: &Map<String, Value>);
}

/// Recorre las entradas de nivel superior del job order.
pub fn walk_job_order(job_order: &Map<String, Value>, visitor: &mut dyn JobOrderVisitor) {
    for (key, value) in job_order {
        walk_value(key, value, visitor);
    }
}

fn walk_value(top_level_key: &str, value: &Value, visitor: &mut dyn JobOrderVisitor) {
    match value {
        Value::Array(items) => {
            for item in items {
                walk_value(top_level_key, item, visitor);
            }
        }
        Value::Object(map) => {
            if map.contains_key("class") {
                visitor.on_class(top_level_key, map);
            } else {
                for inner in map.values() {
                    walk_value(top_level_key, inner, visitor);
                }
            }
        }
        scalar => visitor.on_simple(top_level_key, scalar),
    }
}

/// Nombre de staging seguro para filesystem a partir de un path `dds://`:
/// se quita el prefijo de esquema y `/` y `:` se sustituyen por `_`.
/// Paths que no son dds pasan sin cambios.
pub fn staging_name(path: &str) -> String {
    match path.strip_prefix("dds://") {
        Some(rest) => format!("dds_{}", rest.replace(['/', ':'], "_")),
        None => path.to_string(),
    }
}
