//! seqflow-persistence: backend Postgres (Diesel) de los contratos del core.
pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::DbConfig;
pub use error::PersistenceError;
pub use pg::{build_pool, PgPool, PgStore};
