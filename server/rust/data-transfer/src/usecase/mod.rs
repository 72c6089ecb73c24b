pub mod get_job;
pub mod get_mapping_template;
pub mod get_storage_settings;
pub mod list_jobs;
pub mod list_mapping_templates;
pub mod remove_job;
pub mod submit_job;
pub mod test_storage_connection;
pub mod update_storage_settings;

pub use get_job::GetJobUseCase;
pub use get_mapping_template::GetMappingTemplateUseCase;
pub use get_storage_settings::GetStorageSettingsUseCase;
pub use list_jobs::ListJobsUseCase;
pub use list_mapping_templates::ListMappingTemplatesUseCase;
pub use remove_job::RemoveJobUseCase;
pub use submit_job::SubmitJobUseCase;
pub use test_storage_connection::TestStorageConnectionUseCase;
pub use update_storage_settings::UpdateStorageSettingsUseCase;
