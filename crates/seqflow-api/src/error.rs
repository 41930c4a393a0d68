//! Mapeo de errores del core a respuestas HTTP.
//!
//! Toda respuesta de error lleva el shape `{"detail": "<mensaje>"}`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

use seqflow_core::CoreError;

#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    /// Falta o es inválido el header de identidad.
    MissingUser,
    /// Fallo del runtime al despachar el trabajo bloqueante.
    Internal(String),
}

impl ApiError {
    fn detail(&self) -> String {
        match self {
            ApiError::Core(CoreError::Validation(errors)) => errors.detail(),
            ApiError::Core(e) => e.to_string(),
            ApiError::MissingUser => "Missing or invalid X-User-Id header.".to_string(),
            ApiError::Internal(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail())
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::Validation(_))
            | ApiError::Core(CoreError::InvalidState(_))
            | ApiError::Core(CoreError::InvalidTag(_))
            | ApiError::Core(CoreError::StageGroupMismatch) => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::Forbidden) | ApiError::MissingUser => StatusCode::FORBIDDEN,
            ApiError::Core(CoreError::UpstreamUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            // Un tipo de campo no registrado es corrupción de datos en el
            // esquema del workflow, no un error del cliente.
            ApiError::Core(CoreError::UnknownType(_))
            | ApiError::Core(CoreError::Store(_))
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("internal error: {self}");
        }
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.detail() }))
    }
}
