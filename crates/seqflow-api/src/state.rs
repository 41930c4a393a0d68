//! Estado compartido de la aplicación HTTP.

use std::sync::Arc;

use seqflow_core::{CoreStore, CredentialService, OrchestratorPublisher};

/// Dependencias inyectadas a los handlers. Todo sincrónico; los handlers
/// puentean con `web::block`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CoreStore>,
    pub credentials: Arc<dyn CredentialService>,
    pub publisher: Arc<dyn OrchestratorPublisher>,
}

impl AppState {
    pub fn new(store: Arc<dyn CoreStore>,
               credentials: Arc<dyn CredentialService>,
               publisher: Arc<dyn OrchestratorPublisher>)
               -> Self {
        Self { store, credentials, publisher }
    }
}
