//! Errores del dominio.

use thiserror::Error;

/// Error de validación de los tipos del dominio.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid job template tag: {0}")]
    InvalidTag(String),
    #[error("invalid field type descriptor: {0}")]
    InvalidFieldType(String),
    #[error("invalid job state: {0}")]
    InvalidState(String),
    #[error("invalid job step: {0}")]
    InvalidStep(String),
}
