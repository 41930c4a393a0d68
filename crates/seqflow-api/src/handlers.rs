//! Handlers HTTP del servicio.
//!
//! El core es sincrónico; cada handler puentea con `web::block` para no
//! bloquear los workers de actix.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use seqflow_core::store::{JobStore, TemplateStore};
use seqflow_core::{create_job, init_template, resolve, validate_template, CoreError, JobLifecycle, JobTemplate};
use seqflow_domain::{DdsStagedFile, Job, JobState, JobStep, JobTemplateTag, NewStageGroup, UrlStagedFile};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

async fn blocking<T, F>(f: F) -> Result<T, ApiError>
    where F: FnOnce() -> Result<T, ApiError> + Send + 'static,
          T: Send + 'static
{
    web::block(f).await
                 .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

#[derive(Debug, Deserialize)]
pub struct InitRequest {
    pub tag: JobTemplateTag,
}

#[derive(Debug, Serialize)]
pub struct JobCreated {
    pub job: Uuid,
    pub name: String,
    pub state: JobState,
    pub step: JobStep,
}

#[derive(Debug, Deserialize)]
pub struct StageGroupRequest {
    #[serde(default)]
    pub dds_files: Vec<DdsStagedFile>,
    #[serde(default)]
    pub url_files: Vec<UrlStagedFile>,
}

/// `POST /v2/job-templates/init`: formulario inicial con placeholders.
pub async fn init_job_template(state: web::Data<AppState>,
                               body: web::Json<InitRequest>)
                               -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let tag = body.into_inner().tag;
    let template = blocking(move || {
                       let store: &dyn TemplateStore = state.store.as_ref();
                       let resolved = resolve(store, &tag)?;
                       Ok(init_template(&resolved)?)
                   }).await?;
    Ok(HttpResponse::Created().json(template))
}

/// `POST /v2/job-templates/validate`: 201 con la plantilla si pasa, 400 con
/// el detalle de campos faltantes si no.
pub async fn validate_job_template(state: web::Data<AppState>,
                                   body: web::Json<JobTemplate>)
                                   -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let template = body.into_inner();
    let template = blocking(move || {
                       let store: &dyn TemplateStore = state.store.as_ref();
                       let resolved = resolve(store, &template.tag)?;
                       validate_template(&resolved, &template)?;
                       Ok(template)
                   }).await?;
    Ok(HttpResponse::Created().json(template))
}

/// `POST /v2/job-templates/create-job`: valida y persiste el job en `NEW`.
pub async fn create_job_from_template(state: web::Data<AppState>,
                                      user: AuthUser,
                                      body: web::Json<JobTemplate>)
                                      -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let template = body.into_inner();
    let job = blocking(move || {
                  let templates: &dyn TemplateStore = state.store.as_ref();
                  let resolved = resolve(templates, &template.tag)?;
                  validate_template(&resolved, &template)?;
                  let jobs: &dyn JobStore = state.store.as_ref();
                  Ok(create_job(jobs, &resolved, &template, user.0)?)
              }).await?;
    Ok(HttpResponse::Created().json(JobCreated { job: job.id,
                                                 name: job.name,
                                                 state: job.state,
                                                 step: job.step }))
}

fn lifecycle(state: &AppState) -> JobLifecycle<'_> {
    JobLifecycle::new(state.store.as_ref(), state.credentials.as_ref(), state.publisher.as_ref())
}

/// `POST /v2/jobs/{id}/start`
pub async fn start_job(state: web::Data<AppState>,
                       user: AuthUser,
                       path: web::Path<Uuid>)
                       -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let job_id = path.into_inner();
    let job = blocking(move || Ok(lifecycle(&state).start(job_id, user.0)?)).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// `POST /v2/jobs/{id}/cancel`
pub async fn cancel_job(state: web::Data<AppState>,
                        user: AuthUser,
                        path: web::Path<Uuid>)
                        -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let job_id = path.into_inner();
    let job = blocking(move || Ok(lifecycle(&state).cancel(job_id, user.0)?)).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// `POST /v2/jobs/{id}/restart`
pub async fn restart_job(state: web::Data<AppState>,
                         user: AuthUser,
                         path: web::Path<Uuid>)
                         -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let job_id = path.into_inner();
    let job = blocking(move || Ok(lifecycle(&state).restart(job_id, user.0)?)).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// `DELETE /v2/jobs/{id}`: borrado lógico, el historial se conserva.
pub async fn delete_job(state: web::Data<AppState>,
                        user: AuthUser,
                        path: web::Path<Uuid>)
                        -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let job_id = path.into_inner();
    let job = blocking(move || Ok(lifecycle(&state).delete(job_id, user.0)?)).await?;
    Ok(HttpResponse::Ok().json(job))
}

fn owned_job(state: &AppState, job_id: Uuid, user: Uuid) -> Result<Job, ApiError> {
    let jobs: &dyn JobStore = state.store.as_ref();
    let job = jobs.job(job_id).map_err(CoreError::from)?;
    if job.user_id != user {
        return Err(ApiError::Core(CoreError::Forbidden));
    }
    Ok(job)
}

/// `GET /v2/jobs/{id}`
pub async fn get_job(state: web::Data<AppState>,
                     user: AuthUser,
                     path: web::Path<Uuid>)
                     -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let job_id = path.into_inner();
    let job = blocking(move || owned_job(&state, job_id, user.0)).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// `GET /v2/jobs`: jobs del usuario actuante.
pub async fn list_jobs(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let jobs = blocking(move || {
                   let store: &dyn JobStore = state.store.as_ref();
                   Ok(store.jobs_for_user(user.0).map_err(CoreError::from)?)
               }).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

/// `GET /v2/jobs/{id}/activities`: auditoría append-only de `(state, step)`.
pub async fn list_job_activities(state: web::Data<AppState>,
                                 user: AuthUser,
                                 path: web::Path<Uuid>)
                                 -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let job_id = path.into_inner();
    let activities = blocking(move || {
                         owned_job(&state, job_id, user.0)?;
                         let store: &dyn JobStore = state.store.as_ref();
                         Ok(store.job_activities(job_id).map_err(CoreError::from)?)
                     }).await?;
    Ok(HttpResponse::Ok().json(activities))
}

/// `POST /v2/stage-groups`: registra los archivos de entrada de un futuro job.
pub async fn create_stage_group(state: web::Data<AppState>,
                                user: AuthUser,
                                body: web::Json<StageGroupRequest>)
                                -> Result<HttpResponse, ApiError> {
    let state = state.into_inner();
    let request = body.into_inner();
    let group = blocking(move || {
                    let store: &dyn JobStore = state.store.as_ref();
                    store.create_stage_group(NewStageGroup { user_id: user.0,
                                                             dds_files: request.dds_files,
                                                             url_files: request.url_files })
                         .map_err(|e| ApiError::Core(e.into()))
                }).await?;
    Ok(HttpResponse::Created().json(group))
}

/// Registro de rutas bajo `/v2`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/v2").service(web::resource("/job-templates/init").route(web::post().to(init_job_template)))
                                 .service(web::resource("/job-templates/validate")
                                              .route(web::post().to(validate_job_template)))
                                 .service(web::resource("/job-templates/create-job")
                                              .route(web::post().to(create_job_from_template)))
                                 .service(web::resource("/jobs").route(web::get().to(list_jobs)))
                                 .service(web::resource("/jobs/{id}").route(web::get().to(get_job))
                                                                     .route(web::delete().to(delete_job)))
                                 .service(web::resource("/jobs/{id}/activities")
                                              .route(web::get().to(list_job_activities)))
                                 .service(web::resource("/jobs/{id}/start").route(web::post().to(start_job)))
                                 .service(web::resource("/jobs/{id}/cancel").route(web::post().to(cancel_job)))
                                 .service(web::resource("/jobs/{id}/restart").route(web::post().to(restart_job)))
                                 .service(web::resource("/stage-groups").route(web::post().to(create_stage_group))));
}
