//! Contratos de persistencia que consume el core.
//!
//! El core nunca toca el storage directamente: todo pasa por estos traits.
//! La implementación Postgres vive en `seqflow-persistence`; `InMemoryStore`
//! da un doble completo para tests unitarios.

mod memory;

pub use memory::InMemoryStore;

use thiserror::Error;
use uuid::Uuid;

use seqflow_domain::{Job, JobActivity, JobFileStageGroup, JobState, JobStep, LandoConnection, NewJob, NewStageGroup,
                     VmStrategy, WorkflowConfiguration, WorkflowVersion};

use crate::errors::CoreError;

/// Error de storage, neutral respecto al backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage io: {0}")]
    Io(String),
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => CoreError::NotFound(what),
            other => CoreError::Store(other.to_string()),
        }
    }
}

/// Lecturas necesarias para resolver un tag a plantilla.
pub trait TemplateStore: Send + Sync {
    /// Versión por `(workflow_tag, version)`.
    fn workflow_version_by_tag(&self, workflow_tag: &str, version: u32) -> Result<WorkflowVersion, StoreError>;
    /// Configuración por `(workflow_tag, configuration_tag)`.
    fn workflow_configuration_by_tag(&self,
                                     workflow_tag: &str,
                                     configuration_tag: &str)
                                     -> Result<WorkflowConfiguration, StoreError>;
}

/// Entidades de jobs y sus dependencias.
pub trait JobStore: Send + Sync {
    fn vm_strategy(&self, id: Uuid) -> Result<VmStrategy, StoreError>;
    fn stage_group(&self, id: Uuid) -> Result<JobFileStageGroup, StoreError>;
    fn create_stage_group(&self, new: NewStageGroup) -> Result<JobFileStageGroup, StoreError>;

    /// Inserta el job, liga el stage group (a lo sumo un job por grupo;
    /// violación → `Conflict`) y registra la actividad inicial `(NEW, "")`,
    /// todo en una transacción.
    fn create_job(&self, new: NewJob) -> Result<Job, StoreError>;

    fn job(&self, id: Uuid) -> Result<Job, StoreError>;
    fn jobs_for_user(&self, user_id: Uuid) -> Result<Vec<Job>, StoreError>;

    /// Transición serializada por job: lee el job con lock de fila, aplica
    /// el guard y escribe el nuevo `(state, step)` en la misma transacción.
    /// Si el par cambió, agrega un `JobActivity`. El error del guard aborta
    /// la transacción y se propaga tal cual.
    fn transition_job(&self,
                      job_id: Uuid,
                      guard: &dyn Fn(&Job) -> Result<(JobState, JobStep), CoreError>)
                      -> Result<Job, CoreError>;

    /// Actividades del job en orden de inserción.
    fn job_activities(&self, job_id: Uuid) -> Result<Vec<JobActivity>, StoreError>;
}

/// Fila única con la conexión al broker del orquestador.
pub trait LandoStore: Send + Sync {
    fn lando_connection(&self) -> Result<LandoConnection, StoreError>;
}

/// Marker para pasar un store completo como un solo trait object.
pub trait CoreStore: TemplateStore + JobStore + LandoStore {}
impl<T: TemplateStore + JobStore + LandoStore> CoreStore for T {}
