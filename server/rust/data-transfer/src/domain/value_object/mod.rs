pub mod field_mapping;
pub mod file_source;
pub mod job_status;
pub mod job_type;
pub mod mapping_selection;
pub mod request_context;

pub use field_mapping::FieldMapping;
pub use file_source::FileSource;
pub use job_status::JobStatus;
pub use job_type::JobType;
pub use mapping_selection::{MappingSelection, SaveMappingAction, NO_MAPPING_SELECTED};
pub use request_context::{MissingContext, RequestContext};
