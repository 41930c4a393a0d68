//! seqflow-core: núcleo de plantillas y ciclo de vida de jobs.
pub mod credentials;
pub mod errors;
pub mod factory;
pub mod lifecycle;
pub mod orchestrator;
pub mod placeholder;
pub mod store;
pub mod template;
pub mod walker;

pub use credentials::{CredentialService, DOWNLOAD_ROLES};
pub use errors::{CoreError, ValidationErrors, ValidationKind};
pub use factory::{create_job, merge_job_orders};
pub use lifecycle::{next_state, JobCommand, JobLifecycle};
pub use orchestrator::{CommandKind, OrchestratorCommand, OrchestratorPublisher};
pub use placeholder::{placeholder_for, FILE_PLACEHOLDER_URL, INT_VALUE_PLACEHOLDER, STRING_VALUE_PLACEHOLDER};
pub use store::{CoreStore, InMemoryStore, JobStore, LandoStore, StoreError, TemplateStore};
pub use template::{init_template, resolve, validate_template, JobTemplate, ResolvedJobTemplate};
pub use walker::{staging_name, walk_job_order, JobOrderVisitor};
