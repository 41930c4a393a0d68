//! Taxonomía de errores del core y acumulador de errores de validación.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use seqflow_domain::DomainError;

/// Clase de error por clave de validación. `Required` tiene prioridad sobre
/// `Placeholder` cuando ambos aplican a la misma clave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationKind {
    Required,
    Placeholder,
}

/// Acumulador de errores de validación por clave.
///
/// Las claves aparecen a lo sumo una vez. El orden de reporte es
/// determinista: primero `name`, `fund_code`, `job_order` (en ese orden) y
/// después las claves `job_order.<campo>` en orden lexicográfico.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    entries: Vec<(String, ValidationKind)>,
}

fn key_rank(key: &str) -> (u8, &str) {
    match key {
        "name" => (0, key),
        "fund_code" => (1, key),
        "job_order" => (2, key),
        _ => (3, key),
    }
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marca la clave como requerida; reemplaza un `Placeholder` previo.
    pub fn add_required(&mut self, key: impl Into<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = ValidationKind::Required,
            None => self.entries.push((key, ValidationKind::Required)),
        }
    }

    /// Marca la clave como placeholder sin valor; no pisa un error previo.
    pub fn add_placeholder(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.entries.iter().any(|(k, _)| *k == key) {
            self.entries.push((key, ValidationKind::Placeholder));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn kind_of(&self, key: &str) -> Option<ValidationKind> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, kind)| *kind)
    }

    /// Claves en el orden canónico de reporte.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.iter().map(|(k, _)| k.as_str()).collect();
        keys.sort_by_key(|k| key_rank(k));
        keys
    }

    /// Mensaje uniforme para la respuesta HTTP (errores required y
    /// placeholder se reportan igual).
    pub fn detail(&self) -> String {
        format!("Missing required field(s): {}", self.keys().join(", "))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail())
    }
}

/// Error del core. El mapeo a HTTP vive en la capa de API.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid job template tag: {0}")]
    InvalidTag(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("{0}")]
    InvalidState(String),
    #[error("stage group belongs to a different user")]
    StageGroupMismatch,
    #[error("forbidden")]
    Forbidden,
    #[error("upstream service unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("unknown workflow field type: {0}")]
    UnknownType(String),
    #[error("storage error: {0}")]
    Store(String),
}

impl From<DomainError> for CoreError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidTag(t) => CoreError::InvalidTag(t),
            DomainError::InvalidFieldType(t) => CoreError::UnknownType(t),
            // Estados o pasos no parseables sólo pueden venir de datos
            // corruptos en storage.
            other => CoreError::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_wins_over_placeholder_for_same_key() {
        let mut errors = ValidationErrors::new();
        errors.add_placeholder("name");
        errors.add_required("name");
        errors.add_placeholder("name");
        assert_eq!(errors.kind_of("name"), Some(ValidationKind::Required));
        assert_eq!(errors.keys(), vec!["name"]);
    }

    #[test]
    fn detail_orders_top_level_then_job_order_keys() {
        let mut errors = ValidationErrors::new();
        errors.add_placeholder("job_order.threads");
        errors.add_required("fund_code");
        errors.add_placeholder("job_order.items");
        errors.add_required("name");
        assert_eq!(errors.detail(),
                   "Missing required field(s): name, fund_code, job_order.items, job_order.threads");
    }
}
