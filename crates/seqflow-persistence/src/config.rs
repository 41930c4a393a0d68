//! Configuración de la conexión a Postgres.
//!
//! La URL sigue la convención Diesel (`DATABASE_URL`). El tamaño del pool
//! se ajusta con `SEQFLOW_DB_MIN_CONNECTIONS` y `SEQFLOW_DB_MAX_CONNECTIONS`;
//! sin ellas aplican defaults pensados para una instancia única del servidor.
//! Un archivo `.env` en el directorio de trabajo se carga una sola vez.

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    // Sin .env no es un error: en despliegue las variables vienen del entorno.
    let _ = dotenv();
});

const DEFAULT_MIN_CONNECTIONS: u32 = 2;
const DEFAULT_MAX_CONNECTIONS: u32 = 16;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let url = env::var("DATABASE_URL").expect("DATABASE_URL no definido");
        Self { url,
               min_connections: pool_size(env::var("SEQFLOW_DB_MIN_CONNECTIONS").ok(), DEFAULT_MIN_CONNECTIONS),
               max_connections: pool_size(env::var("SEQFLOW_DB_MAX_CONNECTIONS").ok(), DEFAULT_MAX_CONNECTIONS) }
    }
}

// Un valor vacío o no numérico cae al default en vez de abortar el arranque.
fn pool_size(raw: Option<String>, default: u32) -> u32 {
    raw.as_deref().map(str::trim).filter(|v| !v.is_empty()).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Carga `.env` de forma anticipada; el binario lo invoca antes de leer
/// cualquier otra variable de entorno.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_parses_or_falls_back() {
        assert_eq!(pool_size(Some("8".to_string()), DEFAULT_MIN_CONNECTIONS), 8);
        assert_eq!(pool_size(Some(" 8 ".to_string()), DEFAULT_MIN_CONNECTIONS), 8);
        assert_eq!(pool_size(Some(String::new()), DEFAULT_MIN_CONNECTIONS), DEFAULT_MIN_CONNECTIONS);
        assert_eq!(pool_size(Some("many".to_string()), DEFAULT_MAX_CONNECTIONS), DEFAULT_MAX_CONNECTIONS);
        assert_eq!(pool_size(None, DEFAULT_MAX_CONNECTIONS), DEFAULT_MAX_CONNECTIONS);
    }
}
