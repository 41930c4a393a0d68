//! Conexión al broker del orquestador ("lando connection").
//!
//! Una única fila persistente guarda las credenciales del broker y el nombre
//! de la cola de trabajo; se lee al arranque y se refresca sólo por acción
//! administrativa explícita.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandoConnection {
    pub host: String,
    pub username: String,
    pub password: String,
    pub queue_name: String,
}

impl LandoConnection {
    /// URL AMQP para abrir la conexión.
    pub fn amqp_url(&self) -> String {
        format!("amqp://{}:{}@{}:5672", self.username, self.password, self.host)
    }
}
