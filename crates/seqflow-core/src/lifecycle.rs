//! Controlador del ciclo de vida de jobs.
//!
//! La tabla de transiciones indexada por `(estado actual, comando)` es la
//! fuente autoritativa de los mensajes de error; los guards no se
//! dispersan por los handlers. La transición se ejecuta dentro del store
//! (transacción con lock de fila); los permisos y el publish ocurren recién
//! después del commit y sus fallos no revierten el estado.

use log::{debug, info};
use uuid::Uuid;

use seqflow_domain::{Job, JobState, JobStep};

use crate::credentials::{CredentialService, DOWNLOAD_ROLES};
use crate::errors::CoreError;
use crate::orchestrator::{OrchestratorCommand, OrchestratorPublisher};
use crate::store::JobStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCommand {
    Start,
    Cancel,
    Restart,
    Delete,
}

/// Tabla de transiciones: devuelve el nuevo `(state, step)` o el motivo de
/// rechazo. El `step` no cambia en ningún comando; lo avanza el
/// orquestador.
pub fn next_state(job: &Job, command: JobCommand) -> Result<(JobState, JobStep), CoreError> {
    match command {
        JobCommand::Start => match job.state {
            JobState::Authorized => Ok((JobState::Starting, job.step)),
            _ => Err(CoreError::InvalidState("Job needs authorization token before it can start.".to_string())),
        },
        JobCommand::Cancel => {
            if job.state.is_terminal() {
                Err(CoreError::InvalidState(format!("Job at state {} cannot be canceled.", job.state)))
            } else {
                Ok((JobState::Canceling, job.step))
            }
        }
        JobCommand::Restart => match job.state {
            JobState::Error | JobState::Cancel => {
                // Tras RECORD_OUTPUT_PROJECT el proyecto de salida puede
                // haber quedado registrado a medias; reejecutar duplicaría
                // resultados.
                if job.state == JobState::Error && job.step == JobStep::RecordOutputProject {
                    Err(CoreError::InvalidState(format!("Restart not allowed for jobs at step {}.", job.step.label())))
                } else {
                    Ok((JobState::Restarting, job.step))
                }
            }
            _ => Err(CoreError::InvalidState("Job is not at ERROR or CANCEL state.".to_string())),
        },
        JobCommand::Delete => {
            if job.state == JobState::Deleted {
                Err(CoreError::InvalidState("Job is already deleted.".to_string()))
            } else {
                Ok((JobState::Deleted, job.step))
            }
        }
    }
}

/// Media los comandos de ciclo de vida entre la API, el store, el servicio
/// de credenciales y el orquestador.
pub struct JobLifecycle<'a> {
    store: &'a dyn JobStore,
    credentials: &'a dyn CredentialService,
    publisher: &'a dyn OrchestratorPublisher,
}

impl<'a> JobLifecycle<'a> {
    pub fn new(store: &'a dyn JobStore,
               credentials: &'a dyn CredentialService,
               publisher: &'a dyn OrchestratorPublisher)
               -> Self {
        Self { store, credentials, publisher }
    }

    fn transition(&self, job_id: Uuid, acting_user: Uuid, command: JobCommand) -> Result<Job, CoreError> {
        self.store.transition_job(job_id, &move |job: &Job| {
                      if job.user_id != acting_user {
                          return Err(CoreError::Forbidden);
                      }
                      next_state(job, command)
                  })
    }

    /// Otorga `file_downloader` a cada par `(proyecto, credencial)` del
    /// stage group que aún no tenga un rol con permiso de descarga.
    fn grant_download_permissions(&self, job: &Job, acting_user: Uuid) -> Result<(), CoreError> {
        let stage_group = self.store.stage_group(job.stage_group_id)?;
        for (project_id, credential_id) in stage_group.distinct_project_credentials() {
            let role = self.credentials.project_role(&project_id, credential_id)?;
            let has_download = role.as_deref().is_some_and(|r| DOWNLOAD_ROLES.contains(&r));
            if !has_download {
                debug!("granting file_downloader on project {project_id} for job {}", job.id);
                self.credentials.grant_download(&project_id, credential_id, acting_user)?;
            }
        }
        Ok(())
    }

    /// start: sólo desde `AUTHORIZED`. Otorga permisos de descarga y publica
    /// `start_job`.
    pub fn start(&self, job_id: Uuid, acting_user: Uuid) -> Result<Job, CoreError> {
        let job = self.transition(job_id, acting_user, JobCommand::Start)?;
        info!("job {job_id} -> STARTING");
        self.grant_download_permissions(&job, acting_user)?;
        self.publisher.publish(&OrchestratorCommand::start_job(job_id))?;
        Ok(job)
    }

    /// cancel: desde cualquier estado no terminal. Publica `cancel_job`.
    pub fn cancel(&self, job_id: Uuid, acting_user: Uuid) -> Result<Job, CoreError> {
        let job = self.transition(job_id, acting_user, JobCommand::Cancel)?;
        info!("job {job_id} -> CANCELING");
        self.publisher.publish(&OrchestratorCommand::cancel_job(job_id))?;
        Ok(job)
    }

    /// restart: desde `ERROR` o `CANCEL`, salvo `ERROR` en el paso
    /// RECORD_OUTPUT_PROJECT. Reotorga permisos y publica `restart_job`.
    pub fn restart(&self, job_id: Uuid, acting_user: Uuid) -> Result<Job, CoreError> {
        let job = self.transition(job_id, acting_user, JobCommand::Restart)?;
        info!("job {job_id} -> RESTARTING");
        self.grant_download_permissions(&job, acting_user)?;
        self.publisher.publish(&OrchestratorCommand::restart_job(job_id))?;
        Ok(job)
    }

    /// Borrado lógico: estado `DELETED`, historial retenido. No notifica al
    /// orquestador.
    pub fn delete(&self, job_id: Uuid, acting_user: Uuid) -> Result<Job, CoreError> {
        let job = self.transition(job_id, acting_user, JobCommand::Delete)?;
        info!("job {job_id} -> DELETED");
        Ok(job)
    }
}
