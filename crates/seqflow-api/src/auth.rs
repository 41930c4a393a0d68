//! Identidad del usuario actuante.
//!
//! La autenticación real queda delante de este servicio; acá sólo se lee el
//! header `X-User-Id` (UUID) para aplicar las reglas de propiedad. Sin
//! header válido la respuesta es 403.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.headers()
                      .get("X-User-Id")
                      .and_then(|v| v.to_str().ok())
                      .and_then(|v| Uuid::parse_str(v).ok());
        ready(user.map(AuthUser).ok_or(ApiError::MissingUser))
    }
}
