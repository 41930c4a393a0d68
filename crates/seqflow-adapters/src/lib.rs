//! seqflow-adapters: clientes concretos hacia los servicios externos.
//!
//! - `lando`: publicador AMQP de comandos hacia el orquestador.
//! - `dds`: cliente HTTP del servicio de credenciales del data store.
pub mod dds;
pub mod lando;

pub use dds::DdsCredentialService;
pub use lando::LandoPublisher;
