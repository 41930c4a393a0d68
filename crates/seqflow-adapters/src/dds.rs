//! Cliente HTTP del servicio de permisos del data store.
//!
//! Expone el contrato `CredentialService` del core sobre la API REST del
//! data store: consulta del rol actual de una credencial sobre un proyecto
//! y otorgamiento de `file_downloader`. Autenticación por token de agente
//! en el header `Authorization`.

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use seqflow_core::credentials::{CredentialService, FILE_DOWNLOADER};
use seqflow_core::errors::CoreError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize, Deserialize)]
struct AuthRole {
    id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PermissionBody {
    auth_role: AuthRole,
}

pub struct DdsCredentialService {
    client: Client,
    base_url: String,
    agent_token: String,
}

impl DdsCredentialService {
    /// `base_url` sin barra final, p. ej. `https://dds.example.org/api/v1`.
    pub fn new(base_url: impl Into<String>, agent_token: impl Into<String>) -> Result<Self, CoreError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT)
                                      .build()
                                      .map_err(|e| CoreError::UpstreamUnavailable(format!("http client: {e}")))?;
        Ok(Self { client,
                  base_url: base_url.into().trim_end_matches('/').to_string(),
                  agent_token: agent_token.into() })
    }

    fn permission_url(&self, project_id: &str, credential_id: Uuid) -> String {
        format!("{}/projects/{}/permissions/{}", self.base_url, project_id, credential_id)
    }

    fn upstream(e: reqwest::Error) -> CoreError {
        warn!("data store request failed: {e}");
        CoreError::UpstreamUnavailable(format!("data store: {e}"))
    }
}

impl CredentialService for DdsCredentialService {
    fn project_role(&self, project_id: &str, credential_id: Uuid) -> Result<Option<String>, CoreError> {
        let response = self.client
                           .get(self.permission_url(project_id, credential_id))
                           .header("Authorization", &self.agent_token)
                           .send()
                           .map_err(Self::upstream)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: PermissionBody = response.json().map_err(Self::upstream)?;
                debug!("credential {} has role {} on project {}", credential_id, body.auth_role.id, project_id);
                Ok(Some(body.auth_role.id))
            }
            status => Err(CoreError::UpstreamUnavailable(format!("data store returned {status}"))),
        }
    }

    fn grant_download(&self, project_id: &str, credential_id: Uuid, acting_user: Uuid) -> Result<(), CoreError> {
        let response = self.client
                           .put(self.permission_url(project_id, credential_id))
                           .header("Authorization", &self.agent_token)
                           .query(&[("as_user", acting_user.to_string())])
                           .json(&PermissionBody { auth_role: AuthRole { id: FILE_DOWNLOADER.to_string() } })
                           .send()
                           .map_err(Self::upstream)?;
        if response.status().is_success() {
            debug!("granted {} to credential {} on project {}", FILE_DOWNLOADER, credential_id, project_id);
            Ok(())
        } else {
            Err(CoreError::UpstreamUnavailable(format!("data store returned {}", response.status())))
        }
    }
}
