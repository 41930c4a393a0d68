//! Publicador AMQP hacia la cola de trabajo del orquestador.
//!
//! Conexión nueva por publicación: el volumen es bajo (un comando por acción
//! de usuario) y así no hay conexión de larga vida que monitorear. La cola
//! se declara durable e idempotente antes de cada envío. Cualquier fallo de
//! transporte se reporta como `UpstreamUnavailable`; el cambio de estado del
//! job ya está confirmado y no se revierte.

use amiquip::{Connection, Exchange, Publish, QueueDeclareOptions};
use log::{debug, warn};

use seqflow_core::errors::CoreError;
use seqflow_core::orchestrator::{OrchestratorCommand, OrchestratorPublisher};
use seqflow_domain::LandoConnection;

pub struct LandoPublisher {
    connection: LandoConnection,
}

impl LandoPublisher {
    pub fn new(connection: LandoConnection) -> Self {
        Self { connection }
    }

    fn send(&self, body: &[u8]) -> Result<(), amiquip::Error> {
        let mut conn = Connection::insecure_open(&self.connection.amqp_url())?;
        let channel = conn.open_channel(None)?;
        channel.queue_declare(&self.connection.queue_name,
                              QueueDeclareOptions { durable: true, ..QueueDeclareOptions::default() })?;
        let exchange = Exchange::direct(&channel);
        exchange.publish(Publish::new(body, &self.connection.queue_name))?;
        conn.close()
    }
}

impl OrchestratorPublisher for LandoPublisher {
    fn publish(&self, command: &OrchestratorCommand) -> Result<(), CoreError> {
        let body = serde_json::to_vec(command).map_err(|e| CoreError::Store(e.to_string()))?;
        debug!("publishing {} for job {}", command.kind.as_str(), command.job_id);
        self.send(&body).map_err(|e| {
                            warn!("broker publish failed for job {}: {}", command.job_id, e);
                            CoreError::UpstreamUnavailable(format!("message broker: {e}"))
                        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn unreachable_broker_maps_to_upstream_unavailable() {
        let publisher = LandoPublisher::new(LandoConnection { host: "127.0.0.1".into(),
                                                              username: "guest".into(),
                                                              password: "guest".into(),
                                                              queue_name: "lando_commands".into() });
        // Puerto AMQP cerrado en el entorno de test.
        let result = publisher.publish(&OrchestratorCommand::start_job(Uuid::new_v4()));
        assert!(matches!(result, Err(CoreError::UpstreamUnavailable(_))));
    }
}
