//! Fábrica de jobs: fusión del job order y materialización del Job.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use uuid::Uuid;

use seqflow_domain::{Job, NewJob};

use crate::errors::{CoreError, ValidationErrors};
use crate::store::JobStore;
use crate::template::{JobTemplate, ResolvedJobTemplate};

/// Fusión del job order del sistema con el del usuario. Sesgada a derecha:
/// en colisión de claves gana el valor del usuario (semántica explícita del
/// contrato).
pub fn merge_job_orders(system: &IndexMap<String, Value>, user: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = Map::new();
    for (key, value) in system {
        merged.insert(key.clone(), value.clone());
    }
    for (key, value) in user {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Crea el Job a partir de una plantilla ya validada.
///
/// - VM strategy: la de la plantilla si viene, si no la default de la
///   configuración.
/// - Share group: siempre el de la configuración (la plantilla no puede
///   sobrescribirlo).
/// - Invariante: el stage group pertenece al usuario actuante.
pub fn create_job(store: &dyn JobStore,
                  resolved: &ResolvedJobTemplate,
                  template: &JobTemplate,
                  user_id: Uuid)
                  -> Result<Job, CoreError> {
    let stage_group_id = match template.stage_group {
        Some(id) => id,
        None => {
            let mut errors = ValidationErrors::new();
            errors.add_required("stage_group");
            return Err(CoreError::Validation(errors));
        }
    };

    let stage_group = store.stage_group(stage_group_id)?;
    if stage_group.user_id != user_id {
        return Err(CoreError::StageGroupMismatch);
    }

    let empty = Map::new();
    let user_order = template.job_order.as_ref().and_then(Value::as_object).unwrap_or(&empty);
    let merged = merge_job_orders(&resolved.configuration.system_job_order, user_order);
    let job_order = serde_json::to_string(&Value::Object(merged)).map_err(|e| CoreError::Store(e.to_string()))?;

    let vm_strategy_id = template.job_vm_strategy.unwrap_or(resolved.configuration.default_vm_strategy_id);
    // Falla temprano si la estrategia referida no existe.
    store.vm_strategy(vm_strategy_id)?;

    let new_job = NewJob { user_id,
                           workflow_version_id: resolved.version.id,
                           vm_strategy_id,
                           stage_group_id,
                           share_group_id: resolved.configuration.share_group_id,
                           name: template.name.clone().unwrap_or_default(),
                           fund_code: template.fund_code.clone().unwrap_or_default(),
                           job_order };
    Ok(store.create_job(new_job)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, JobStore};
    use crate::template::JobTemplate;
    use chrono::Utc;
    use seqflow_domain::{FieldDescriptor, FieldType, JobFileStageGroup, JobState, JobStep, JobTemplateTag, VmStrategy,
                         Workflow, WorkflowConfiguration, WorkflowVersion};
    use serde_json::json;

    struct Fixture {
        store: InMemoryStore,
        resolved: ResolvedJobTemplate,
        user_id: Uuid,
        stage_group_id: Uuid,
        default_vm: Uuid,
    }

    fn fixture(system_job_order: IndexMap<String, Value>) -> Fixture {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        let default_vm = Uuid::new_v4();
        let share_group = Uuid::new_v4();

        let workflow = Workflow { id: Uuid::new_v4(), name: "Exome Seq".to_string(), tag: "exomeseq".to_string() };
        let version = WorkflowVersion { id: Uuid::new_v4(),
                                        workflow_id: workflow.id,
                                        version: 1,
                                        url: "https://example.org/exomeseq-1.cwl".to_string(),
                                        fields: vec![FieldDescriptor { name: "color".to_string(),
                                                                       field_type: FieldType::Atomic("string".to_string()) }],
                                        created: Utc::now() };
        let configuration = WorkflowConfiguration { id: Uuid::new_v4(),
                                                    workflow_id: workflow.id,
                                                    tag: "b37xGen".to_string(),
                                                    system_job_order,
                                                    default_vm_strategy_id: default_vm,
                                                    share_group_id: share_group };
        store.add_workflow(workflow);
        store.add_version(version.clone());
        store.add_configuration(configuration.clone());
        store.add_vm_strategy(VmStrategy { id: default_vm,
                                           name: "default".to_string(),
                                           vm_flavor: "m1.large".to_string(),
                                           vm_settings: json!({}),
                                           volume_size_base: 100,
                                           volume_size_factor: 2 });
        let stage_group_id = Uuid::new_v4();
        store.add_stage_group(JobFileStageGroup { id: stage_group_id,
                                                  user_id,
                                                  dds_files: vec![],
                                                  url_files: vec![] });
        let tag: JobTemplateTag = "exomeseq/v1/b37xGen".parse().unwrap();
        let resolved = ResolvedJobTemplate { tag, version, configuration };
        Fixture { store, resolved, user_id, stage_group_id, default_vm }
    }

    fn template(fx: &Fixture, job_order: Value) -> JobTemplate {
        JobTemplate { tag: fx.resolved.tag.clone(),
                      name: Some("My Job".to_string()),
                      fund_code: Some("001".to_string()),
                      job_order: Some(job_order),
                      stage_group: Some(fx.stage_group_id),
                      share_group: Some(Uuid::new_v4()),
                      job_vm_strategy: None }
    }

    #[test]
    fn merge_is_right_biased() {
        let mut system = IndexMap::new();
        system.insert("A".to_string(), json!("B"));
        system.insert("color".to_string(), json!("blue"));
        let mut user = Map::new();
        user.insert("color".to_string(), json!("red"));
        let merged = merge_job_orders(&system, &user);
        assert_eq!(merged.get("A"), Some(&json!("B")));
        assert_eq!(merged.get("color"), Some(&json!("red")));
    }

    #[test]
    fn creates_job_with_merged_order_and_initial_activity() {
        // Escenario S4.
        let mut system = IndexMap::new();
        system.insert("A".to_string(), json!("B"));
        let fx = fixture(system);
        let job = create_job(&fx.store, &fx.resolved, &template(&fx, json!({"color": "red"})), fx.user_id).unwrap();

        assert_eq!(job.name, "My Job");
        assert_eq!(job.fund_code, "001");
        assert_eq!(job.state, JobState::New);
        assert_eq!(job.step, JobStep::None);
        let stored: Value = serde_json::from_str(&job.job_order).unwrap();
        assert_eq!(stored, json!({"A": "B", "color": "red"}));

        let activities = fx.store.job_activities(job.id).unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].state, JobState::New);
        assert_eq!(activities[0].step, JobStep::None);
    }

    #[test]
    fn share_group_always_comes_from_configuration() {
        let fx = fixture(IndexMap::new());
        let t = template(&fx, json!({"color": "red"}));
        let job = create_job(&fx.store, &fx.resolved, &t, fx.user_id).unwrap();
        assert_eq!(job.share_group_id, fx.resolved.configuration.share_group_id);
        assert_ne!(Some(job.share_group_id), t.share_group);
    }

    #[test]
    fn vm_strategy_prefers_template_override() {
        let fx = fixture(IndexMap::new());
        let override_vm = Uuid::new_v4();
        fx.store.add_vm_strategy(VmStrategy { id: override_vm,
                                              name: "big".to_string(),
                                              vm_flavor: "m1.xxlarge".to_string(),
                                              vm_settings: json!({}),
                                              volume_size_base: 400,
                                              volume_size_factor: 4 });
        let mut t = template(&fx, json!({}));
        t.job_vm_strategy = Some(override_vm);
        let job = create_job(&fx.store, &fx.resolved, &t, fx.user_id).unwrap();
        assert_eq!(job.vm_strategy_id, override_vm);

        let t = template(&fx, json!({}));
        // Sin override: la default de la configuración. Requiere otro stage
        // group porque el primero ya quedó ligado.
        let sg = fx.store
                   .create_stage_group(seqflow_domain::NewStageGroup { user_id: fx.user_id,
                                                                       dds_files: vec![],
                                                                       url_files: vec![] })
                   .unwrap();
        let mut t2 = t;
        t2.stage_group = Some(sg.id);
        let job = create_job(&fx.store, &fx.resolved, &t2, fx.user_id).unwrap();
        assert_eq!(job.vm_strategy_id, fx.default_vm);
    }

    #[test]
    fn foreign_stage_group_is_rejected() {
        let fx = fixture(IndexMap::new());
        let stranger = Uuid::new_v4();
        let err = create_job(&fx.store, &fx.resolved, &template(&fx, json!({})), stranger).unwrap_err();
        assert!(matches!(err, CoreError::StageGroupMismatch));
    }

    #[test]
    fn missing_stage_group_is_a_validation_error() {
        let fx = fixture(IndexMap::new());
        let mut t = template(&fx, json!({}));
        t.stage_group = None;
        let err = create_job(&fx.store, &fx.resolved, &t, fx.user_id).unwrap_err();
        match err {
            CoreError::Validation(errors) => assert_eq!(errors.keys(), vec!["stage_group"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn stage_group_cannot_back_two_jobs() {
        let fx = fixture(IndexMap::new());
        create_job(&fx.store, &fx.resolved, &template(&fx, json!({})), fx.user_id).unwrap();
        let err = create_job(&fx.store, &fx.resolved, &template(&fx, json!({})), fx.user_id).unwrap_err();
        assert!(matches!(err, CoreError::Store(_)));
    }
}
