//! seqflow-api: frontera HTTP del servicio de jobs.
pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use handlers::configure;
pub use state::AppState;
