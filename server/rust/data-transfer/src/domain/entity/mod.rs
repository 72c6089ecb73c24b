pub mod job_item;
pub mod mapping_template;
pub mod storage_settings;

pub use job_item::{JobItem, NewJobItem};
pub use mapping_template::MappingTemplate;
pub use storage_settings::{ObjectStorageSettings, SftpSettings, StorageSettings, MASKED_SECRET};
