//! Interfaz con el servicio externo de credenciales del data store.
//!
//! Antes de arrancar un job hay que garantizar que cada credencial del
//! stage group puede leer su proyecto. El core sólo consume esta interfaz;
//! el cliente HTTP concreto vive en `seqflow-adapters`.

use uuid::Uuid;

use crate::errors::CoreError;

/// Roles que ya incluyen permiso de descarga; con cualquiera de ellos no se
/// vuelve a otorgar.
pub const DOWNLOAD_ROLES: [&str; 3] = ["file_downloader", "file_editor", "project_admin"];

/// Rol a otorgar cuando falta permiso.
pub const FILE_DOWNLOADER: &str = "file_downloader";

pub trait CredentialService: Send + Sync {
    /// Rol actual de la credencial sobre el proyecto, si tiene alguno.
    fn project_role(&self, project_id: &str, credential_id: Uuid) -> Result<Option<String>, CoreError>;

    /// Otorga `file_downloader` sobre el proyecto en nombre del usuario
    /// actuante.
    fn grant_download(&self, project_id: &str, credential_id: Uuid, acting_user: Uuid) -> Result<(), CoreError>;
}
