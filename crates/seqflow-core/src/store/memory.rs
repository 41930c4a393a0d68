//! Store en memoria para tests unitarios y de API.
//!
//! Paridad de contrato con el backend Postgres: unicidad de stage group por
//! job, actividad inicial al crear, actividad sólo cuando `(state, step)`
//! cambia en una transición.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use seqflow_domain::{Job, JobActivity, JobFileStageGroup, JobState, JobStep, LandoConnection, NewJob, NewStageGroup,
                     VmStrategy, Workflow, WorkflowConfiguration, WorkflowVersion};

use crate::errors::CoreError;

use super::{JobStore, LandoStore, StoreError, TemplateStore};

#[derive(Default)]
struct Inner {
    workflows: Vec<Workflow>,
    versions: Vec<WorkflowVersion>,
    configurations: Vec<WorkflowConfiguration>,
    vm_strategies: HashMap<Uuid, VmStrategy>,
    stage_groups: HashMap<Uuid, JobFileStageGroup>,
    jobs: HashMap<Uuid, Job>,
    activities: Vec<JobActivity>,
    next_activity_id: i64,
    lando: Option<LandoConnection>,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Helpers de seeding para tests.

    pub fn add_workflow(&self, workflow: Workflow) {
        self.inner.lock().unwrap().workflows.push(workflow);
    }

    pub fn add_version(&self, version: WorkflowVersion) {
        self.inner.lock().unwrap().versions.push(version);
    }

    pub fn add_configuration(&self, configuration: WorkflowConfiguration) {
        self.inner.lock().unwrap().configurations.push(configuration);
    }

    pub fn add_vm_strategy(&self, strategy: VmStrategy) {
        self.inner.lock().unwrap().vm_strategies.insert(strategy.id, strategy);
    }

    pub fn add_stage_group(&self, group: JobFileStageGroup) {
        self.inner.lock().unwrap().stage_groups.insert(group.id, group);
    }

    pub fn set_lando_connection(&self, connection: LandoConnection) {
        self.inner.lock().unwrap().lando = Some(connection);
    }

    /// Fija `(state, step)` sin pasar por el guard (setup de tests).
    pub fn force_job_state(&self, job_id: Uuid, state: JobState, step: JobStep) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(job) = inner.jobs.get_mut(&job_id) {
            job.state = state;
            job.step = step;
        }
    }
}

impl Inner {
    fn push_activity(&mut self, job_id: Uuid, state: JobState, step: JobStep) {
        self.next_activity_id += 1;
        self.activities.push(JobActivity { id: self.next_activity_id,
                                           job_id,
                                           state,
                                           step,
                                           created: Utc::now() });
    }
}

impl TemplateStore for InMemoryStore {
    fn workflow_version_by_tag(&self, workflow_tag: &str, version: u32) -> Result<WorkflowVersion, StoreError> {
        let inner = self.inner.lock().unwrap();
        let workflow = inner.workflows
                            .iter()
                            .find(|w| w.tag == workflow_tag)
                            .ok_or_else(|| StoreError::NotFound("workflow".to_string()))?;
        inner.versions
             .iter()
             .find(|v| v.workflow_id == workflow.id && v.version == version)
             .cloned()
             .ok_or_else(|| StoreError::NotFound("workflow version".to_string()))
    }

    fn workflow_configuration_by_tag(&self,
                                     workflow_tag: &str,
                                     configuration_tag: &str)
                                     -> Result<WorkflowConfiguration, StoreError> {
        let inner = self.inner.lock().unwrap();
        let workflow = inner.workflows
                            .iter()
                            .find(|w| w.tag == workflow_tag)
                            .ok_or_else(|| StoreError::NotFound("workflow".to_string()))?;
        inner.configurations
             .iter()
             .find(|c| c.workflow_id == workflow.id && c.tag == configuration_tag)
             .cloned()
             .ok_or_else(|| StoreError::NotFound("workflow configuration".to_string()))
    }
}

impl JobStore for InMemoryStore {
    fn vm_strategy(&self, id: Uuid) -> Result<VmStrategy, StoreError> {
        self.inner
            .lock()
            .unwrap()
            .vm_strategies
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("vm strategy".to_string()))
    }

    fn stage_group(&self, id: Uuid) -> Result<JobFileStageGroup, StoreError> {
        self.inner
            .lock()
            .unwrap()
            .stage_groups
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("stage group".to_string()))
    }

    fn create_stage_group(&self, new: NewStageGroup) -> Result<JobFileStageGroup, StoreError> {
        let group = JobFileStageGroup { id: Uuid::new_v4(),
                                        user_id: new.user_id,
                                        dds_files: new.dds_files,
                                        url_files: new.url_files };
        self.inner.lock().unwrap().stage_groups.insert(group.id, group.clone());
        Ok(group)
    }

    fn create_job(&self, new: NewJob) -> Result<Job, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.stage_groups.contains_key(&new.stage_group_id) {
            return Err(StoreError::NotFound("stage group".to_string()));
        }
        if inner.jobs.values().any(|j| j.stage_group_id == new.stage_group_id) {
            return Err(StoreError::Conflict("stage group already attached to a job".to_string()));
        }
        let now = Utc::now();
        let job = Job { id: Uuid::new_v4(),
                        user_id: new.user_id,
                        workflow_version_id: new.workflow_version_id,
                        vm_strategy_id: new.vm_strategy_id,
                        stage_group_id: new.stage_group_id,
                        share_group_id: new.share_group_id,
                        name: new.name,
                        fund_code: new.fund_code,
                        job_order: new.job_order,
                        state: JobState::New,
                        step: JobStep::None,
                        created: now,
                        last_updated: now };
        inner.jobs.insert(job.id, job.clone());
        inner.push_activity(job.id, JobState::New, JobStep::None);
        Ok(job)
    }

    fn job(&self, id: Uuid) -> Result<Job, StoreError> {
        self.inner
            .lock()
            .unwrap()
            .jobs
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("job".to_string()))
    }

    fn jobs_for_user(&self, user_id: Uuid) -> Result<Vec<Job>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut jobs: Vec<Job> = inner.jobs.values().filter(|j| j.user_id == user_id).cloned().collect();
        jobs.sort_by_key(|j| j.created);
        Ok(jobs)
    }

    fn transition_job(&self,
                      job_id: Uuid,
                      guard: &dyn Fn(&Job) -> Result<(JobState, JobStep), CoreError>)
                      -> Result<Job, CoreError> {
        // El Mutex cumple aquí el rol del lock de fila: guard y escritura
        // son atómicos respecto a otras transiciones.
        let mut inner = self.inner.lock().unwrap();
        let current = inner.jobs
                           .get(&job_id)
                           .cloned()
                           .ok_or_else(|| CoreError::NotFound("job".to_string()))?;
        let (state, step) = guard(&current)?;
        let changed = state != current.state || step != current.step;
        let job = inner.jobs.get_mut(&job_id).expect("job present under lock");
        job.state = state;
        job.step = step;
        job.last_updated = Utc::now();
        let job = job.clone();
        if changed {
            inner.push_activity(job_id, state, step);
        }
        Ok(job)
    }

    fn job_activities(&self, job_id: Uuid) -> Result<Vec<JobActivity>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.activities.iter().filter(|a| a.job_id == job_id).cloned().collect())
    }
}

impl LandoStore for InMemoryStore {
    fn lando_connection(&self) -> Result<LandoConnection, StoreError> {
        self.inner
            .lock()
            .unwrap()
            .lando
            .clone()
            .ok_or_else(|| StoreError::NotFound("lando connection".to_string()))
    }
}
