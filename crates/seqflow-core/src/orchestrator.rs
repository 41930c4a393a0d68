//! Envelope de comandos hacia el orquestador.
//!
//! El core publica sobres opacos en una única cola de trabajo; el cliente
//! AMQP concreto vive en `seqflow-adapters`. Fire-and-forget: no se espera
//! más confirmación que la del broker.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    StartJob,
    CancelJob,
    RestartJob,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::StartJob => "start_job",
            CommandKind::CancelJob => "cancel_job",
            CommandKind::RestartJob => "restart_job",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorCommand {
    pub kind: CommandKind,
    pub job_id: Uuid,
}

impl OrchestratorCommand {
    pub fn start_job(job_id: Uuid) -> Self {
        Self { kind: CommandKind::StartJob, job_id }
    }

    pub fn cancel_job(job_id: Uuid) -> Self {
        Self { kind: CommandKind::CancelJob, job_id }
    }

    pub fn restart_job(job_id: Uuid) -> Self {
        Self { kind: CommandKind::RestartJob, job_id }
    }
}

/// Publicador del envelope en la cola de trabajo del orquestador.
///
/// Un fallo de transporte es `UpstreamUnavailable` y NO revierte el cambio
/// de estado previo; el operador reintenta.
pub trait OrchestratorPublisher: Send + Sync {
    fn publish(&self, command: &OrchestratorCommand) -> Result<(), CoreError>;
}
