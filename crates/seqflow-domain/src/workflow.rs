//! Entidades administrativas: workflows, versiones y configuraciones.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::field_type::FieldDescriptor;

/// Familia nombrada de pipelines. El `tag` es un slug global único.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub tag: String,
}

/// Versión inmutable de un workflow con su esquema de campos de entrada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowVersion {
    pub id: Uuid,
    pub workflow_id: Uuid,
    /// Número de versión, único por workflow, mínimo 1.
    pub version: u32,
    /// Localizador del documento de workflow externo (CWL).
    pub url: String,
    /// Campos declarados, en orden. El orden es contractual: determina el
    /// orden de los campos de usuario en el formulario.
    pub fields: Vec<FieldDescriptor>,
    pub created: DateTime<Utc>,
}

/// Preset de una configuración: job order del sistema, estrategia de VM por
/// defecto y share group, ligados a un workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfiguration {
    pub id: Uuid,
    pub workflow_id: Uuid,
    /// Slug único por workflow.
    pub tag: String,
    /// Valores provistos por el sistema; sus claves son las "system keys".
    /// `IndexMap` conserva el orden de inserción para serializar estable.
    pub system_job_order: IndexMap<String, Value>,
    pub default_vm_strategy_id: Uuid,
    pub share_group_id: Uuid,
}

/// Dimensionamiento de recursos de la VM; el core lo consume opaco.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmStrategy {
    pub id: Uuid,
    pub name: String,
    pub vm_flavor: String,
    pub vm_settings: Value,
    pub volume_size_base: i32,
    pub volume_size_factor: i32,
}

/// Destinatarios de los resultados de un job terminado; opaco para el core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareGroup {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
}
