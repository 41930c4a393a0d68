// seqflow-domain library entry point
pub mod error;
pub mod field_type;
pub mod job;
pub mod lando;
pub mod stage_group;
pub mod tag;
pub mod workflow;

pub use error::DomainError;
pub use field_type::{FieldDescriptor, FieldType};
pub use job::{Job, JobActivity, JobState, JobStep, NewJob};
pub use lando::LandoConnection;
pub use stage_group::{DdsStagedFile, JobFileStageGroup, NewStageGroup, UrlStagedFile};
pub use tag::JobTemplateTag;
pub use workflow::{ShareGroup, VmStrategy, Workflow, WorkflowConfiguration, WorkflowVersion};
