//! Migraciones embebidas del esquema seqflow.
//!
//! El directorio `migrations/` de este crate crea las tablas de workflows,
//! versiones, configuraciones, stage groups, jobs, actividades y la conexión
//! Lando. `build_pool` las aplica una vez al arrancar.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::PersistenceError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn run_pending_migrations(conn: &mut PgConnection) -> Result<(), PersistenceError> {
    // Los `gen_random_uuid()` del esquema requieren pgcrypto; si el rol no
    // puede crear extensiones se asume que ya fue provisionada.
    if let Err(e) = conn.batch_execute("CREATE EXTENSION IF NOT EXISTS pgcrypto;") {
        log::warn!("could not ensure pgcrypto extension: {e}");
    }
    let applied = conn.run_pending_migrations(MIGRATIONS)
                      .map_err(|e| PersistenceError::Unknown(format!("schema migration failed: {e}")))?;
    if !applied.is_empty() {
        log::info!("applied {} schema migration(s)", applied.len());
    }
    Ok(())
}
