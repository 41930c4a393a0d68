//! Resolución y validación de plantillas de job.
//!
//! Una plantilla resuelta junta la versión del workflow con la
//! configuración; los "campos de usuario" son los campos declarados por la
//! versión cuyos nombres no provee el `system_job_order` de la
//! configuración.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use seqflow_domain::{FieldDescriptor, JobTemplateTag, WorkflowConfiguration, WorkflowVersion};

use crate::errors::{CoreError, ValidationErrors};
use crate::placeholder::{self, is_placeholder_scalar, placeholder_for, FILE_PLACEHOLDER_URL};
use crate::store::TemplateStore;
use crate::walker::{walk_job_order, JobOrderVisitor};

/// Shape wire de una plantilla enviada por el usuario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTemplate {
    pub tag: JobTemplateTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_order: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_group: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_group: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_vm_strategy: Option<Uuid>,
}

/// Par `(version, configuration)` resuelto desde un tag.
#[derive(Debug, Clone)]
pub struct ResolvedJobTemplate {
    pub tag: JobTemplateTag,
    pub version: WorkflowVersion,
    pub configuration: WorkflowConfiguration,
}

impl ResolvedJobTemplate {
    /// Subsecuencia ordenada de `version.fields` cuyos nombres no son
    /// system keys.
    pub fn user_fields(&self) -> Vec<&FieldDescriptor> {
        self.version
            .fields
            .iter()
            .filter(|f| !self.configuration.system_job_order.contains_key(&f.name))
            .collect()
    }
}

/// Carga versión y configuración para un tag ya parseado.
pub fn resolve(store: &dyn TemplateStore, tag: &JobTemplateTag) -> Result<ResolvedJobTemplate, CoreError> {
    let version = store.workflow_version_by_tag(&tag.workflow_tag, tag.version)?;
    let configuration = store.workflow_configuration_by_tag(&tag.workflow_tag, &tag.configuration_tag)?;
    Ok(ResolvedJobTemplate { tag: tag.clone(), version, configuration })
}

/// Construye el formulario inicial: `name` y `fund_code` en placeholder y un
/// job order con el placeholder de cada campo de usuario.
pub fn init_template(resolved: &ResolvedJobTemplate) -> Result<JobTemplate, CoreError> {
    let mut job_order = Map::new();
    for field in resolved.user_fields() {
        job_order.insert(field.name.clone(), placeholder_for(&field.field_type)?);
    }
    Ok(JobTemplate { tag: resolved.tag.clone(),
                     name: Some(placeholder::STRING_VALUE_PLACEHOLDER.to_string()),
                     fund_code: Some(placeholder::STRING_VALUE_PLACEHOLDER.to_string()),
                     job_order: Some(Value::Object(job_order)),
                     stage_group: None,
                     share_group: None,
                     job_vm_strategy: None })
}

fn is_placeholder_str(s: &str) -> bool {
    is_placeholder_scalar(&Value::String(s.to_string()))
}

struct PlaceholderVisitor<'a> {
    errors: &'a mut ValidationErrors,
}

impl JobOrderVisitor for PlaceholderVisitor<'_> {
    fn on_simple(&mut self, top_level_key: &str, value: &Value) {
        if is_placeholder_scalar(value) {
            self.errors.add_placeholder(format!("job_order.{top_level_key}"));
        }
    }

    fn on_class(&mut self, top_level_key: &str, value: &Map<String, Value>) {
        let is_file = value.get("class").and_then(Value::as_str) == Some("File");
        let path_is_placeholder = value.get("path").and_then(Value::as_str) == Some(FILE_PLACEHOLDER_URL);
        if is_file && path_is_placeholder {
            self.errors.add_placeholder(format!("job_order.{top_level_key}"));
        }
    }
}

/// Valida la plantilla contra la resolución. Todos los errores se juntan en
/// una sola respuesta; nunca se aborta en el primero.
pub fn validate_template(resolved: &ResolvedJobTemplate, template: &JobTemplate) -> Result<(), CoreError> {
    let mut errors = ValidationErrors::new();

    check_top_level(&mut errors, "name", template.name.as_deref());
    check_top_level(&mut errors, "fund_code", template.fund_code.as_deref());

    let job_order = match &template.job_order {
        Some(Value::Object(map)) => map,
        // Ausente, null o con forma no-mapping: requerido y no hay más que
        // revisar dentro.
        _ => {
            errors.add_required("job_order");
            return finish(errors);
        }
    };

    for field in resolved.user_fields() {
        if !job_order.contains_key(&field.name) {
            errors.add_required(format!("job_order.{}", field.name));
        }
    }

    walk_job_order(job_order, &mut PlaceholderVisitor { errors: &mut errors });

    finish(errors)
}

fn check_top_level(errors: &mut ValidationErrors, key: &str, value: Option<&str>) {
    match value {
        None | Some("") => errors.add_required(key),
        Some(s) if is_placeholder_str(s) => errors.add_placeholder(key),
        Some(_) => {}
    }
}

fn finish(errors: ValidationErrors) -> Result<(), CoreError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::Utc;
    use indexmap::IndexMap;
    use seqflow_domain::{FieldType, Workflow, WorkflowConfiguration, WorkflowVersion};
    use serde_json::json;

    fn field(name: &str, descriptor: Value) -> FieldDescriptor {
        FieldDescriptor { name: name.to_string(),
                          field_type: FieldType::from_value(&descriptor).unwrap() }
    }

    /// Workflow `exomeseq` v1 con campos `threads: int`, `items: string` y
    /// configuración `b37xGen` sin system keys (escenarios S1-S3).
    fn seeded_store(system_job_order: IndexMap<String, Value>) -> (InMemoryStore, JobTemplateTag) {
        let store = InMemoryStore::new();
        let workflow = Workflow { id: Uuid::new_v4(), name: "Exome Seq".to_string(), tag: "exomeseq".to_string() };
        store.add_version(WorkflowVersion { id: Uuid::new_v4(),
                                            workflow_id: workflow.id,
                                            version: 1,
                                            url: "https://example.org/exomeseq-1.cwl".to_string(),
                                            fields: vec![field("threads", json!("int")), field("items", json!("string"))],
                                            created: Utc::now() });
        store.add_configuration(WorkflowConfiguration { id: Uuid::new_v4(),
                                                        workflow_id: workflow.id,
                                                        tag: "b37xGen".to_string(),
                                                        system_job_order,
                                                        default_vm_strategy_id: Uuid::new_v4(),
                                                        share_group_id: Uuid::new_v4() });
        store.add_workflow(workflow);
        let tag = "exomeseq/v1/b37xGen".parse().unwrap();
        (store, tag)
    }

    fn template(tag: &JobTemplateTag) -> JobTemplate {
        JobTemplate { tag: tag.clone(),
                      name: None,
                      fund_code: None,
                      job_order: None,
                      stage_group: None,
                      share_group: None,
                      job_vm_strategy: None }
    }

    #[test]
    fn resolve_misses_are_not_found() {
        let (store, _) = seeded_store(IndexMap::new());
        let bad: JobTemplateTag = "exomeseq/v2/b37xGen".parse().unwrap();
        assert!(matches!(resolve(&store, &bad), Err(CoreError::NotFound(_))));
        let bad: JobTemplateTag = "exomeseq/v1/other".parse().unwrap();
        assert!(matches!(resolve(&store, &bad), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn user_fields_exclude_system_keys_preserving_order() {
        let mut system = IndexMap::new();
        system.insert("threads".to_string(), json!(8));
        let (store, tag) = seeded_store(system);
        let resolved = resolve(&store, &tag).unwrap();
        let names: Vec<&str> = resolved.user_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["items"]);
    }

    #[test]
    fn init_builds_placeholder_form() {
        // Escenario S1.
        let (store, tag) = seeded_store(IndexMap::new());
        let resolved = resolve(&store, &tag).unwrap();
        let t = init_template(&resolved).unwrap();
        assert_eq!(t.name.as_deref(), Some("<String Value>"));
        assert_eq!(t.fund_code.as_deref(), Some("<String Value>"));
        assert_eq!(t.job_order.unwrap(),
                   json!({"threads": "<Integer Value>", "items": "<String Value>"}));
    }

    #[test]
    fn validate_reports_missing_fields() {
        // Escenario S2.
        let (store, tag) = seeded_store(IndexMap::new());
        let resolved = resolve(&store, &tag).unwrap();
        let mut t = template(&tag);
        t.job_order = Some(json!({"threads": 1}));
        let err = validate_template(&resolved, &t).unwrap_err();
        match err {
            CoreError::Validation(errors) => {
                assert_eq!(errors.detail(),
                           "Missing required field(s): name, fund_code, job_order.items");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_reports_placeholders() {
        // Escenario S3.
        let (store, tag) = seeded_store(IndexMap::new());
        let resolved = resolve(&store, &tag).unwrap();
        let mut t = template(&tag);
        t.name = Some("<String Value>".to_string());
        t.fund_code = Some("001".to_string());
        t.job_order = Some(json!({"items": "<String Value>", "threads": "<Integer Value>"}));
        let err = validate_template(&resolved, &t).unwrap_err();
        match err {
            CoreError::Validation(errors) => {
                assert_eq!(errors.detail(),
                           "Missing required field(s): name, job_order.items, job_order.threads");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_missing_job_order_short_circuits_tree_checks() {
        let (store, tag) = seeded_store(IndexMap::new());
        let resolved = resolve(&store, &tag).unwrap();
        let err = validate_template(&resolved, &template(&tag)).unwrap_err();
        match err {
            CoreError::Validation(errors) => {
                assert_eq!(errors.detail(),
                           "Missing required field(s): name, fund_code, job_order");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_detects_file_placeholder_nodes() {
        let (store, tag) = seeded_store(IndexMap::new());
        let resolved = resolve(&store, &tag).unwrap();
        let mut t = template(&tag);
        t.name = Some("My Job".to_string());
        t.fund_code = Some("001".to_string());
        t.job_order = Some(json!({
            "threads": 4,
            "items": "ok",
            "reference": {"class": "File", "path": "dds://<Project Name>/<File Path>"}
        }));
        let err = validate_template(&resolved, &t).unwrap_err();
        match err {
            CoreError::Validation(errors) => {
                assert_eq!(errors.detail(), "Missing required field(s): job_order.reference");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn placeholder_form_fails_validation_at_every_user_field() {
        // Propiedad 4 del contrato: el formulario recién inicializado,
        // reenviado sin cambios, produce un error Placeholder por campo.
        let (store, tag) = seeded_store(IndexMap::new());
        let resolved = resolve(&store, &tag).unwrap();
        let mut t = init_template(&resolved).unwrap();
        t.fund_code = Some("001".to_string());
        t.name = Some("Named".to_string());
        let err = validate_template(&resolved, &t).unwrap_err();
        match err {
            CoreError::Validation(errors) => {
                assert_eq!(errors.keys(), vec!["job_order.items", "job_order.threads"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_template_passes() {
        let (store, tag) = seeded_store(IndexMap::new());
        let resolved = resolve(&store, &tag).unwrap();
        let mut t = template(&tag);
        t.name = Some("My Job".to_string());
        t.fund_code = Some("001".to_string());
        t.job_order = Some(json!({"threads": 4, "items": "sample-a"}));
        assert!(validate_template(&resolved, &t).is_ok());
    }
}
