//! Job y su máquina de estados.
//!
//! Estados: `NEW → AUTHORIZED → STARTING → RUNNING → FINISHED`, con ramas
//! `RUNNING → ERROR`, `RUNNING → CANCELING → CANCEL` y
//! `{ERROR, CANCEL} → RESTARTING → RUNNING`. Terminales: `FINISHED`,
//! `DELETED`. El sub-paso (`step`) sólo tiene sentido dentro de `RUNNING`
//! y lo avanza el orquestador, no este servicio.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    New,
    Authorized,
    Starting,
    Running,
    Finished,
    Error,
    Canceling,
    Cancel,
    Restarting,
    Deleted,
}

impl JobState {
    /// Un estado terminal no acepta ningún comando de ciclo de vida.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Finished | JobState::Deleted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::New => "NEW",
            JobState::Authorized => "AUTHORIZED",
            JobState::Starting => "STARTING",
            JobState::Running => "RUNNING",
            JobState::Finished => "FINISHED",
            JobState::Error => "ERROR",
            JobState::Canceling => "CANCELING",
            JobState::Cancel => "CANCEL",
            JobState::Restarting => "RESTARTING",
            JobState::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(JobState::New),
            "AUTHORIZED" => Ok(JobState::Authorized),
            "STARTING" => Ok(JobState::Starting),
            "RUNNING" => Ok(JobState::Running),
            "FINISHED" => Ok(JobState::Finished),
            "ERROR" => Ok(JobState::Error),
            "CANCELING" => Ok(JobState::Canceling),
            "CANCEL" => Ok(JobState::Cancel),
            "RESTARTING" => Ok(JobState::Restarting),
            "DELETED" => Ok(JobState::Deleted),
            other => Err(DomainError::InvalidState(other.to_string())),
        }
    }
}

impl Serialize for JobState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e: DomainError| D::Error::custom(e.to_string()))
    }
}

/// Sub-paso dentro de `RUNNING`. `None` se persiste como cadena vacía.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobStep {
    #[default]
    None,
    CreateVm,
    Staging,
    Run,
    StoreOutput,
    RecordOutputProject,
    TerminateVm,
}

impl JobStep {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStep::None => "",
            JobStep::CreateVm => "CREATE_VM",
            JobStep::Staging => "STAGING",
            JobStep::Run => "RUN",
            JobStep::StoreOutput => "STORE_OUTPUT",
            JobStep::RecordOutputProject => "RECORD_OUTPUT_PROJECT",
            JobStep::TerminateVm => "TERMINATE_VM",
        }
    }

    /// Etiqueta legible para mensajes de error al usuario.
    pub fn label(self) -> &'static str {
        match self {
            JobStep::None => "",
            JobStep::CreateVm => "Create VM",
            JobStep::Staging => "Staging",
            JobStep::Run => "Run",
            JobStep::StoreOutput => "Store Output",
            JobStep::RecordOutputProject => "Record Output Project",
            JobStep::TerminateVm => "Terminate VM",
        }
    }
}

impl fmt::Display for JobStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStep {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(JobStep::None),
            "CREATE_VM" => Ok(JobStep::CreateVm),
            "STAGING" => Ok(JobStep::Staging),
            "RUN" => Ok(JobStep::Run),
            "STORE_OUTPUT" => Ok(JobStep::StoreOutput),
            "RECORD_OUTPUT_PROJECT" => Ok(JobStep::RecordOutputProject),
            "TERMINATE_VM" => Ok(JobStep::TerminateVm),
            other => Err(DomainError::InvalidStep(other.to_string())),
        }
    }
}

impl Serialize for JobStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e: DomainError| D::Error::custom(e.to_string()))
    }
}

/// Instancia parametrizada de un workflow lista para ejecutarse.
///
/// Invariante: `stage_group.user_id == user_id` (verificado al crear).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workflow_version_id: Uuid,
    pub vm_strategy_id: Uuid,
    pub stage_group_id: Uuid,
    pub share_group_id: Uuid,
    pub name: String,
    pub fund_code: String,
    /// Job order fusionado (sistema ∪ usuario), serializado como JSON.
    pub job_order: String,
    pub state: JobState,
    pub step: JobStep,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Shape de inserción de un job; el store asigna id y timestamps y registra
/// la primera actividad `(NEW, "")` en la misma transacción.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub user_id: Uuid,
    pub workflow_version_id: Uuid,
    pub vm_strategy_id: Uuid,
    pub stage_group_id: Uuid,
    pub share_group_id: Uuid,
    pub name: String,
    pub fund_code: String,
    pub job_order: String,
}

/// Registro append-only de un cambio de `(state, step)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobActivity {
    pub id: i64,
    pub job_id: Uuid,
    pub state: JobState,
    pub step: JobStep,
    pub created: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_roundtrips_through_str() {
        for state in [JobState::New,
                      JobState::Authorized,
                      JobState::Starting,
                      JobState::Running,
                      JobState::Finished,
                      JobState::Error,
                      JobState::Canceling,
                      JobState::Cancel,
                      JobState::Restarting,
                      JobState::Deleted]
        {
            assert_eq!(state.as_str().parse::<JobState>().unwrap(), state);
        }
        assert!("BOGUS".parse::<JobState>().is_err());
    }

    #[test]
    fn step_none_is_empty_string() {
        assert_eq!(JobStep::None.as_str(), "");
        assert_eq!("".parse::<JobStep>().unwrap(), JobStep::None);
        assert_eq!("RECORD_OUTPUT_PROJECT".parse::<JobStep>().unwrap(), JobStep::RecordOutputProject);
    }

    #[test]
    fn terminal_states() {
        assert!(JobState::Finished.is_terminal());
        assert!(JobState::Deleted.is_terminal());
        assert!(!JobState::Error.is_terminal());
        assert!(!JobState::Cancel.is_terminal());
    }

    #[test]
    fn step_labels_for_error_messages() {
        assert_eq!(JobStep::RecordOutputProject.label(), "Record Output Project");
        assert_eq!(JobStep::CreateVm.label(), "Create VM");
    }
}
