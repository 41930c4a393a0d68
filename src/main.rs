//! Binario del servicio: arma el pool, los adapters y el servidor HTTP.

use std::sync::Arc;

use actix_web::web::Data;
use actix_web::{middleware, App, HttpServer};
use log::info;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use seqflow_adapters::{DdsCredentialService, LandoPublisher};
use seqflow_api::{configure, AppState};
use seqflow_core::store::LandoStore;
use seqflow_persistence::config::{init_dotenv, DbConfig};
use seqflow_persistence::pg::{build_pool, PgStore};

fn init_log() {
    let level = log::LevelFilter::Info;

    let encoder = PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S%.3f)} {level} [{thread}] {target} - {m}{n}");
    let stderr = ConsoleAppender::builder().target(Target::Stderr)
                                           .encoder(Box::new(encoder))
                                           .build();

    let config = Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)))
                                  .build(Root::builder().appender("stderr").build(level))
                                  .unwrap();

    log4rs::init_config(config).unwrap();
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    init_log();
    init_dotenv();
    info!("bootstrap");

    let db = DbConfig::from_env();
    let pool = build_pool(&db.url, db.min_connections, db.max_connections)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let store = Arc::new(PgStore::from_pool(pool));

    // La fila de conexión al broker se lee una vez al arranque.
    let lando = store.lando_connection()
                     .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let publisher = Arc::new(LandoPublisher::new(lando));

    let dds_url = env_or("DDS_API_URL", "http://localhost:8000/api/v1");
    let dds_token = env_or("DDS_AGENT_TOKEN", "");
    let credentials = Arc::new(DdsCredentialService::new(dds_url, dds_token)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?);

    let state = AppState::new(store, credentials, publisher);
    let data = Data::new(state);

    let bind = env_or("SEQFLOW_BIND", "0.0.0.0:8080");
    info!("listening on {bind}");
    HttpServer::new(move || {
        App::new().wrap(middleware::Logger::default())
                  .app_data(data.clone())
                  .configure(configure)
    }).bind(bind)?
      .run()
      .await
}
