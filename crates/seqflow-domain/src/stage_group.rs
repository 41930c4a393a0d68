//! Grupos de staging: los archivos de entrada a descargar antes de correr
//! un job. Un grupo pertenece a un único usuario y puede ligarse a lo sumo
//! a un job.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entrada de staging que referencia un objeto del data store externo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdsStagedFile {
    pub project_id: String,
    pub file_id: String,
    /// Credencial del usuario sobre el data store, necesaria para otorgar
    /// permiso de descarga sobre el proyecto.
    pub credential_id: Uuid,
    pub destination_path: String,
    pub size: i64,
}

/// Entrada de staging por URL directa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlStagedFile {
    pub url: String,
    pub destination_path: String,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFileStageGroup {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dds_files: Vec<DdsStagedFile>,
    pub url_files: Vec<UrlStagedFile>,
}

impl JobFileStageGroup {
    /// Pares `(project_id, credential_id)` distintos, en orden estable.
    pub fn distinct_project_credentials(&self) -> Vec<(String, Uuid)> {
        let mut pairs: Vec<(String, Uuid)> = Vec::new();
        for f in &self.dds_files {
            let pair = (f.project_id.clone(), f.credential_id);
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        pairs
    }
}

/// Shape de creación de un grupo de staging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStageGroup {
    pub user_id: Uuid,
    #[serde(default)]
    pub dds_files: Vec<DdsStagedFile>,
    #[serde(default)]
    pub url_files: Vec<UrlStagedFile>,
}
