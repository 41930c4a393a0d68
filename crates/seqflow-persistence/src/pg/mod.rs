//! Implementación Postgres (Diesel) de los contratos del core.
//!
//! Objetivo del módulo:
//! - Paridad de contrato con el `InMemoryStore` del core: unicidad de stage
//!   group por job, actividad inicial al crear, actividad sólo cuando
//!   `(state, step)` cambia.
//! - Transiciones de ciclo de vida serializadas por job: lectura con
//!   `FOR UPDATE`, guard y escritura dentro de la misma transacción.
//! - Aislar el mapeo dominio ↔ filas de DB del resto del sistema.
//! - Manejo básico de errores transitorios: reintento con backoff en
//!   lecturas.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;
use uuid::Uuid;

use seqflow_core::errors::CoreError;
use seqflow_core::store::{JobStore, LandoStore, StoreError, TemplateStore};
use seqflow_domain::{DdsStagedFile, Job, JobActivity, JobFileStageGroup, JobState, JobStep, LandoConnection, NewJob,
                     NewStageGroup, UrlStagedFile, VmStrategy, WorkflowConfiguration, WorkflowVersion};

use crate::config::DbConfig;
use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::{dds_job_input_files, job_activities, job_file_stage_groups, jobs, lando_connections, share_groups,
                    url_job_input_files, vm_strategies, workflow_configurations, workflow_versions, workflows};

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones (inyectable en tests de integración).
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Provider respaldado por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Construye el pool y corre las migraciones pendientes una vez.
pub fn build_pool(url: &str, min_connections: u32, max_connections: u32) -> Result<PgPool, PersistenceError> {
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = r2d2::Pool::builder().min_idle(Some(min_connections))
                                    .max_size(max_connections)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    let mut conn = pool.get().map_err(|e| PersistenceError::TransientIo(format!("pool get: {e}")))?;
    run_pending_migrations(&mut conn)?;
    Ok(pool)
}

/// Determina si conviene reintentar con backoff.
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected") || m.contains("connection closed") || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry simple con backoff muy pequeño (hasta 3 intentos); sólo para
/// unidades de trabajo idempotentes.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

// ---- filas ----

#[derive(Queryable, Debug)]
struct WorkflowRow {
    id: Uuid,
    #[allow(dead_code)]
    name: String,
    #[allow(dead_code)]
    tag: String,
}

#[derive(Queryable, Debug)]
struct VersionRow {
    id: Uuid,
    workflow_id: Uuid,
    version: i32,
    url: String,
    fields: Value,
    created: DateTime<Utc>,
}

impl VersionRow {
    fn into_domain(self) -> Result<WorkflowVersion, PersistenceError> {
        let fields = serde_json::from_value(self.fields).map_err(|e| PersistenceError::CorruptRow(format!("fields: {e}")))?;
        Ok(WorkflowVersion { id: self.id,
                             workflow_id: self.workflow_id,
                             version: self.version as u32,
                             url: self.url,
                             fields,
                             created: self.created })
    }
}

#[derive(Queryable, Debug)]
struct ConfigurationRow {
    id: Uuid,
    workflow_id: Uuid,
    tag: String,
    system_job_order: Value,
    default_vm_strategy_id: Uuid,
    share_group_id: Uuid,
}

impl ConfigurationRow {
    fn into_domain(self) -> Result<WorkflowConfiguration, PersistenceError> {
        let system_job_order: IndexMap<String, Value> =
            serde_json::from_value(self.system_job_order).map_err(|e| {
                                                             PersistenceError::CorruptRow(format!("system_job_order: {e}"))
                                                         })?;
        Ok(WorkflowConfiguration { id: self.id,
                                   workflow_id: self.workflow_id,
                                   tag: self.tag,
                                   system_job_order,
                                   default_vm_strategy_id: self.default_vm_strategy_id,
                                   share_group_id: self.share_group_id })
    }
}

#[derive(Queryable, Debug)]
struct VmStrategyRow {
    id: Uuid,
    name: String,
    vm_flavor: String,
    vm_settings: Value,
    volume_size_base: i32,
    volume_size_factor: i32,
}

impl From<VmStrategyRow> for VmStrategy {
    fn from(row: VmStrategyRow) -> Self {
        VmStrategy { id: row.id,
                     name: row.name,
                     vm_flavor: row.vm_flavor,
                     vm_settings: row.vm_settings,
                     volume_size_base: row.volume_size_base,
                     volume_size_factor: row.volume_size_factor }
    }
}

#[derive(Queryable, Debug)]
struct StageGroupRow {
    id: Uuid,
    user_id: Uuid,
    #[allow(dead_code)]
    created: DateTime<Utc>,
}

#[derive(Queryable, Debug)]
struct DdsFileRow {
    #[allow(dead_code)]
    id: Uuid,
    #[allow(dead_code)]
    stage_group_id: Uuid,
    project_id: String,
    file_id: String,
    credential_id: Uuid,
    destination_path: String,
    size: i64,
}

#[derive(Queryable, Debug)]
struct UrlFileRow {
    #[allow(dead_code)]
    id: Uuid,
    #[allow(dead_code)]
    stage_group_id: Uuid,
    url: String,
    destination_path: String,
    size: i64,
}

#[derive(Queryable, Debug)]
struct JobRow {
    id: Uuid,
    user_id: Uuid,
    workflow_version_id: Uuid,
    vm_strategy_id: Uuid,
    stage_group_id: Uuid,
    share_group_id: Uuid,
    name: String,
    fund_code: String,
    job_order: String,
    state: String,
    step: String,
    created: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl JobRow {
    fn into_domain(self) -> Result<Job, PersistenceError> {
        let state: JobState = self.state.parse().map_err(|e| PersistenceError::CorruptRow(format!("{e}")))?;
        let step: JobStep = self.step.parse().map_err(|e| PersistenceError::CorruptRow(format!("{e}")))?;
        Ok(Job { id: self.id,
                 user_id: self.user_id,
                 workflow_version_id: self.workflow_version_id,
                 vm_strategy_id: self.vm_strategy_id,
                 stage_group_id: self.stage_group_id,
                 share_group_id: self.share_group_id,
                 name: self.name,
                 fund_code: self.fund_code,
                 job_order: self.job_order,
                 state,
                 step,
                 created: self.created,
                 last_updated: self.last_updated })
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = jobs)]
struct NewJobRow<'a> {
    user_id: &'a Uuid,
    workflow_version_id: &'a Uuid,
    vm_strategy_id: &'a Uuid,
    stage_group_id: &'a Uuid,
    share_group_id: &'a Uuid,
    name: &'a str,
    fund_code: &'a str,
    job_order: &'a str,
    state: &'a str,
    step: &'a str,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = job_activities)]
struct NewActivityRow<'a> {
    job_id: &'a Uuid,
    state: &'a str,
    step: &'a str,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = job_file_stage_groups)]
struct NewStageGroupRow<'a> {
    user_id: &'a Uuid,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = dds_job_input_files)]
struct NewDdsFileRow<'a> {
    stage_group_id: &'a Uuid,
    project_id: &'a str,
    file_id: &'a str,
    credential_id: &'a Uuid,
    destination_path: &'a str,
    size: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = url_job_input_files)]
struct NewUrlFileRow<'a> {
    stage_group_id: &'a Uuid,
    url: &'a str,
    destination_path: &'a str,
    size: i64,
}

#[derive(Queryable, Debug)]
struct ActivityRow {
    id: i64,
    job_id: Uuid,
    state: String,
    step: String,
    created: DateTime<Utc>,
}

impl ActivityRow {
    fn into_domain(self) -> Result<JobActivity, PersistenceError> {
        Ok(JobActivity { id: self.id,
                         job_id: self.job_id,
                         state: self.state.parse().map_err(|e| PersistenceError::CorruptRow(format!("{e}")))?,
                         step: self.step.parse().map_err(|e| PersistenceError::CorruptRow(format!("{e}")))?,
                         created: self.created })
    }
}

#[derive(Queryable, Debug)]
struct LandoRow {
    #[allow(dead_code)]
    id: Uuid,
    host: String,
    username: String,
    password: String,
    queue_name: String,
}

// Error interno de una transacción de transición: o bien un rechazo del
// guard (se propaga tal cual) o un error de Diesel.
enum TxError {
    Core(CoreError),
    Db(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(e: diesel::result::Error) -> Self {
        TxError::Db(e)
    }
}

/// Store Postgres; implementa los tres contratos del core.
pub struct PgStore<P: ConnectionProvider = PoolProvider> {
    provider: P,
}

impl PgStore<PoolProvider> {
    pub fn from_pool(pool: PgPool) -> Self {
        Self { provider: PoolProvider { pool } }
    }

    /// Pool + store directo desde variables de entorno.
    pub fn from_env() -> Result<Self, PersistenceError> {
        let cfg = DbConfig::from_env();
        let pool = build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)?;
        Ok(Self::from_pool(pool))
    }
}

impl<P: ConnectionProvider> PgStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    fn workflow_by_tag(&self, workflow_tag: &str) -> Result<WorkflowRow, PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            workflows::table.filter(workflows::tag.eq(workflow_tag))
                            .first::<WorkflowRow>(&mut conn)
                            .map_err(PersistenceError::from)
        })
    }

    fn stage_group_rows(&self, id: Uuid) -> Result<(StageGroupRow, Vec<DdsFileRow>, Vec<UrlFileRow>), PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            let group: StageGroupRow = job_file_stage_groups::table.find(id)
                                                                   .first(&mut conn)
                                                                   .map_err(PersistenceError::from)?;
            let dds: Vec<DdsFileRow> = dds_job_input_files::table.filter(dds_job_input_files::stage_group_id.eq(id))
                                                                 .order(dds_job_input_files::id.asc())
                                                                 .load(&mut conn)
                                                                 .map_err(PersistenceError::from)?;
            let urls: Vec<UrlFileRow> = url_job_input_files::table.filter(url_job_input_files::stage_group_id.eq(id))
                                                                  .order(url_job_input_files::id.asc())
                                                                  .load(&mut conn)
                                                                  .map_err(PersistenceError::from)?;
            Ok((group, dds, urls))
        })
    }
}

impl<P: ConnectionProvider> TemplateStore for PgStore<P> {
    fn workflow_version_by_tag(&self, workflow_tag: &str, version: u32) -> Result<WorkflowVersion, StoreError> {
        let workflow = self.workflow_by_tag(workflow_tag)
                           .map_err(|e| e.into_store_error("workflow"))?;
        let row = with_retry(|| {
                      let mut conn = self.provider.connection()?;
                      workflow_versions::table.filter(workflow_versions::workflow_id.eq(workflow.id))
                                              .filter(workflow_versions::version.eq(version as i32))
                                              .first::<VersionRow>(&mut conn)
                                              .map_err(PersistenceError::from)
                  }).map_err(|e| e.into_store_error("workflow version"))?;
        row.into_domain().map_err(|e| e.into_store_error("workflow version"))
    }

    fn workflow_configuration_by_tag(&self,
                                     workflow_tag: &str,
                                     configuration_tag: &str)
                                     -> Result<WorkflowConfiguration, StoreError> {
        let workflow = self.workflow_by_tag(workflow_tag)
                           .map_err(|e| e.into_store_error("workflow"))?;
        let row = with_retry(|| {
                      let mut conn = self.provider.connection()?;
                      workflow_configurations::table.filter(workflow_configurations::workflow_id.eq(workflow.id))
                                                    .filter(workflow_configurations::tag.eq(configuration_tag))
                                                    .first::<ConfigurationRow>(&mut conn)
                                                    .map_err(PersistenceError::from)
                  }).map_err(|e| e.into_store_error("workflow configuration"))?;
        row.into_domain().map_err(|e| e.into_store_error("workflow configuration"))
    }
}

impl<P: ConnectionProvider> JobStore for PgStore<P> {
    fn vm_strategy(&self, id: Uuid) -> Result<VmStrategy, StoreError> {
        let row = with_retry(|| {
                      let mut conn = self.provider.connection()?;
                      vm_strategies::table.find(id)
                                          .first::<VmStrategyRow>(&mut conn)
                                          .map_err(PersistenceError::from)
                  }).map_err(|e| e.into_store_error("vm strategy"))?;
        Ok(row.into())
    }

    fn stage_group(&self, id: Uuid) -> Result<JobFileStageGroup, StoreError> {
        let (group, dds, urls) = self.stage_group_rows(id).map_err(|e| e.into_store_error("stage group"))?;
        Ok(JobFileStageGroup { id: group.id,
                               user_id: group.user_id,
                               dds_files: dds.into_iter()
                                             .map(|f| DdsStagedFile { project_id: f.project_id,
                                                                      file_id: f.file_id,
                                                                      credential_id: f.credential_id,
                                                                      destination_path: f.destination_path,
                                                                      size: f.size })
                                             .collect(),
                               url_files: urls.into_iter()
                                              .map(|f| UrlStagedFile { url: f.url,
                                                                       destination_path: f.destination_path,
                                                                       size: f.size })
                                              .collect() })
    }

    fn create_stage_group(&self, new: NewStageGroup) -> Result<JobFileStageGroup, StoreError> {
        let mut conn = self.provider.connection().map_err(|e| e.into_store_error("stage group"))?;
        let group_id: Uuid = conn.build_transaction()
                                 .read_write()
                                 .run(|tx| {
                                     let group: StageGroupRow =
                                         diesel::insert_into(job_file_stage_groups::table)
                                             .values(NewStageGroupRow { user_id: &new.user_id })
                                             .get_result(tx)?;
                                     for f in &new.dds_files {
                                         diesel::insert_into(dds_job_input_files::table)
                                             .values(NewDdsFileRow { stage_group_id: &group.id,
                                                                     project_id: &f.project_id,
                                                                     file_id: &f.file_id,
                                                                     credential_id: &f.credential_id,
                                                                     destination_path: &f.destination_path,
                                                                     size: f.size })
                                             .execute(tx)?;
                                     }
                                     for f in &new.url_files {
                                         diesel::insert_into(url_job_input_files::table)
                                             .values(NewUrlFileRow { stage_group_id: &group.id,
                                                                     url: &f.url,
                                                                     destination_path: &f.destination_path,
                                                                     size: f.size })
                                             .execute(tx)?;
                                     }
                                     Ok::<Uuid, diesel::result::Error>(group.id)
                                 })
                                 .map_err(|e| PersistenceError::from(e).into_store_error("stage group"))?;
        self.stage_group(group_id)
    }

    fn create_job(&self, new: NewJob) -> Result<Job, StoreError> {
        debug!("create_job: user={} stage_group={}", new.user_id, new.stage_group_id);
        let mut conn = self.provider.connection().map_err(|e| e.into_store_error("job"))?;
        let row: JobRow = conn.build_transaction()
                              .read_write()
                              .run(|tx| {
                                  let row: JobRow =
                                      diesel::insert_into(jobs::table)
                                          .values(NewJobRow { user_id: &new.user_id,
                                                              workflow_version_id: &new.workflow_version_id,
                                                              vm_strategy_id: &new.vm_strategy_id,
                                                              stage_group_id: &new.stage_group_id,
                                                              share_group_id: &new.share_group_id,
                                                              name: &new.name,
                                                              fund_code: &new.fund_code,
                                                              job_order: &new.job_order,
                                                              state: JobState::New.as_str(),
                                                              step: JobStep::None.as_str() })
                                          .get_result(tx)?;
                                  diesel::insert_into(job_activities::table)
                                      .values(NewActivityRow { job_id: &row.id,
                                                               state: JobState::New.as_str(),
                                                               step: JobStep::None.as_str() })
                                      .execute(tx)?;
                                  Ok::<JobRow, diesel::result::Error>(row)
                              })
                              .map_err(|e| PersistenceError::from(e).into_store_error("job"))?;
        row.into_domain().map_err(|e| e.into_store_error("job"))
    }

    fn job(&self, id: Uuid) -> Result<Job, StoreError> {
        let row = with_retry(|| {
                      let mut conn = self.provider.connection()?;
                      jobs::table.find(id).first::<JobRow>(&mut conn).map_err(PersistenceError::from)
                  }).map_err(|e| e.into_store_error("job"))?;
        row.into_domain().map_err(|e| e.into_store_error("job"))
    }

    fn jobs_for_user(&self, user_id: Uuid) -> Result<Vec<Job>, StoreError> {
        let rows = with_retry(|| {
                       let mut conn = self.provider.connection()?;
                       jobs::table.filter(jobs::user_id.eq(user_id))
                                  .order(jobs::created.asc())
                                  .load::<JobRow>(&mut conn)
                                  .map_err(PersistenceError::from)
                   }).map_err(|e| e.into_store_error("job"))?;
        rows.into_iter()
            .map(|r| r.into_domain().map_err(|e| e.into_store_error("job")))
            .collect()
    }

    fn transition_job(&self,
                      job_id: Uuid,
                      guard: &dyn Fn(&Job) -> Result<(JobState, JobStep), CoreError>)
                      -> Result<Job, CoreError> {
        let mut conn = self.provider
                           .connection()
                           .map_err(|e| CoreError::from(e.into_store_error("job")))?;
        let result = conn.build_transaction().read_write().run(|tx| -> Result<JobRow, TxError> {
            // Lock de fila: serializa transiciones concurrentes del mismo job.
            let row: JobRow = jobs::table.find(job_id)
                                         .for_update()
                                         .first(tx)
                                         .map_err(|e| match e {
                                             diesel::result::Error::NotFound => {
                                                 TxError::Core(CoreError::NotFound("job".to_string()))
                                             }
                                             other => TxError::Db(other),
                                         })?;
            let job = row.into_domain()
                         .map_err(|e| TxError::Core(CoreError::Store(e.to_string())))?;
            let (state, step) = guard(&job).map_err(TxError::Core)?;
            let changed = state != job.state || step != job.step;
            let updated: JobRow = diesel::update(jobs::table.find(job_id))
                .set((jobs::state.eq(state.as_str()), jobs::step.eq(step.as_str()), jobs::last_updated.eq(diesel::dsl::now)))
                .get_result(tx)?;
            if changed {
                diesel::insert_into(job_activities::table)
                    .values(NewActivityRow { job_id: &job_id, state: state.as_str(), step: step.as_str() })
                    .execute(tx)?;
            }
            Ok(updated)
        });
        match result {
            Ok(row) => row.into_domain().map_err(|e| CoreError::Store(e.to_string())),
            Err(TxError::Core(e)) => Err(e),
            Err(TxError::Db(e)) => Err(CoreError::from(PersistenceError::from(e).into_store_error("job"))),
        }
    }

    fn job_activities(&self, job_id: Uuid) -> Result<Vec<JobActivity>, StoreError> {
        let rows = with_retry(|| {
                       let mut conn = self.provider.connection()?;
                       job_activities::table.filter(job_activities::job_id.eq(job_id))
                                            .order(job_activities::id.asc())
                                            .load::<ActivityRow>(&mut conn)
                                            .map_err(PersistenceError::from)
                   }).map_err(|e| e.into_store_error("job activity"))?;
        rows.into_iter()
            .map(|r| r.into_domain().map_err(|e| e.into_store_error("job activity")))
            .collect()
    }
}

impl<P: ConnectionProvider> LandoStore for PgStore<P> {
    fn lando_connection(&self) -> Result<LandoConnection, StoreError> {
        let row = with_retry(|| {
                      let mut conn = self.provider.connection()?;
                      lando_connections::table.order(lando_connections::id.asc())
                                              .first::<LandoRow>(&mut conn)
                                              .map_err(PersistenceError::from)
                  }).map_err(|e| e.into_store_error("lando connection"))?;
        Ok(LandoConnection { host: row.host,
                             username: row.username,
                             password: row.password,
                             queue_name: row.queue_name })
    }
}

/// Helpers administrativos de seed (usados por tests de integración y
/// herramientas de carga inicial).
pub mod admin {
    use super::*;

    pub fn insert_workflow(conn: &mut PgConnection, name: &str, tag: &str) -> Result<Uuid, PersistenceError> {
        let id: Uuid = diesel::insert_into(workflows::table)
            .values((workflows::name.eq(name), workflows::tag.eq(tag)))
            .returning(workflows::id)
            .get_result(conn)?;
        Ok(id)
    }

    pub fn insert_version(conn: &mut PgConnection,
                          workflow_id: Uuid,
                          version: i32,
                          url: &str,
                          fields: &Value)
                          -> Result<Uuid, PersistenceError> {
        let id: Uuid = diesel::insert_into(workflow_versions::table)
            .values((workflow_versions::workflow_id.eq(workflow_id),
                     workflow_versions::version.eq(version),
                     workflow_versions::url.eq(url),
                     workflow_versions::fields.eq(fields)))
            .returning(workflow_versions::id)
            .get_result(conn)?;
        Ok(id)
    }

    pub fn insert_vm_strategy(conn: &mut PgConnection, name: &str, flavor: &str) -> Result<Uuid, PersistenceError> {
        let id: Uuid = diesel::insert_into(vm_strategies::table)
            .values((vm_strategies::name.eq(name),
                     vm_strategies::vm_flavor.eq(flavor),
                     vm_strategies::volume_size_base.eq(100),
                     vm_strategies::volume_size_factor.eq(2)))
            .returning(vm_strategies::id)
            .get_result(conn)?;
        Ok(id)
    }

    pub fn insert_share_group(conn: &mut PgConnection, name: &str) -> Result<Uuid, PersistenceError> {
        let id: Uuid = diesel::insert_into(share_groups::table)
            .values(share_groups::name.eq(name))
            .returning(share_groups::id)
            .get_result(conn)?;
        Ok(id)
    }

    pub fn insert_configuration(conn: &mut PgConnection,
                                workflow_id: Uuid,
                                tag: &str,
                                system_job_order: &Value,
                                default_vm_strategy_id: Uuid,
                                share_group_id: Uuid)
                                -> Result<Uuid, PersistenceError> {
        let id: Uuid = diesel::insert_into(workflow_configurations::table)
            .values((workflow_configurations::workflow_id.eq(workflow_id),
                     workflow_configurations::tag.eq(tag),
                     workflow_configurations::system_job_order.eq(system_job_order),
                     workflow_configurations::default_vm_strategy_id.eq(default_vm_strategy_id),
                     workflow_configurations::share_group_id.eq(share_group_id)))
            .returning(workflow_configurations::id)
            .get_result(conn)?;
        Ok(id)
    }

    pub fn insert_lando_connection(conn: &mut PgConnection,
                                   connection: &LandoConnection)
                                   -> Result<Uuid, PersistenceError> {
        let id: Uuid = diesel::insert_into(lando_connections::table)
            .values((lando_connections::host.eq(&connection.host),
                     lando_connections::username.eq(&connection.username),
                     lando_connections::password.eq(&connection.password),
                     lando_connections::queue_name.eq(&connection.queue_name)))
            .returning(lando_connections::id)
            .get_result(conn)?;
        Ok(id)
    }
}
